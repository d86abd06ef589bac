//! Test utilities
//!
//! Recording fakes for the orchestrator's collaborators and generators for
//! property-based tests.

#[cfg(test)]
pub mod fakes {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::core::options::BuildOptions;
    use crate::core::task::{RenderRequest, Task};
    use crate::core::version::{VersionError, VersionGuard};

    /// A collaborator invocation
    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        /// Build task called with these options
        Build(BuildOptions),
        /// Render task called with this request
        Render(RenderRequest),
    }

    /// Shared, ordered log of collaborator invocations
    #[derive(Debug, Clone, Default)]
    pub struct Recorder {
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl Recorder {
        /// Snapshot of the events recorded so far
        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    /// Build task returning `built <selector>`
    #[derive(Debug)]
    pub struct FakeBuild {
        recorder: Recorder,
        fail_on: Option<String>,
    }

    impl FakeBuild {
        pub fn new(recorder: &Recorder) -> Self {
            Self {
                recorder: recorder.clone(),
                fail_on: None,
            }
        }

        /// Fail builds whose selector displays as `app` (`<default>` when unset)
        #[must_use]
        pub fn failing_on(mut self, app: &str) -> Self {
            self.fail_on = Some(app.to_string());
            self
        }
    }

    #[async_trait]
    impl Task<BuildOptions> for FakeBuild {
        type Output = String;

        async fn run(&self, input: BuildOptions) -> anyhow::Result<String> {
            let app = input
                .app
                .as_ref()
                .map_or_else(|| "<default>".to_string(), ToString::to_string);
            self.recorder.push(Event::Build(input));
            if self.fail_on.as_deref() == Some(app.as_str()) {
                anyhow::bail!("compilation error in {app}");
            }
            Ok(format!("built {app}"))
        }
    }

    /// Render task returning `rendered <route>`
    #[derive(Debug)]
    pub struct FakeRender {
        recorder: Recorder,
        fail: bool,
    }

    impl FakeRender {
        pub fn new(recorder: &Recorder) -> Self {
            Self {
                recorder: recorder.clone(),
                fail: false,
            }
        }

        #[must_use]
        pub fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    #[async_trait]
    impl Task<RenderRequest> for FakeRender {
        type Output = String;

        async fn run(&self, input: RenderRequest) -> anyhow::Result<String> {
            let route = input.route.clone();
            self.recorder.push(Event::Render(input));
            if self.fail {
                anyhow::bail!("server bundle not found");
            }
            Ok(format!("rendered {route}"))
        }
    }

    /// Version guard with canned answers
    #[derive(Debug, Default)]
    pub struct FakeGuard {
        compiler_too_old: bool,
    }

    impl FakeGuard {
        pub fn passing() -> Self {
            Self::default()
        }

        pub fn compiler_too_old() -> Self {
            Self {
                compiler_too_old: true,
            }
        }
    }

    impl VersionGuard for FakeGuard {
        fn assert_minimum_framework_version(&self, _project_root: &Path) -> Result<(), VersionError> {
            Ok(())
        }

        fn assert_minimum_compiler_version(&self, _project_root: &Path) -> Result<(), VersionError> {
            if self.compiler_too_old {
                Err(VersionError::VersionMismatch {
                    package: "typescript".to_string(),
                    installed: "1.8.0".to_string(),
                    constraint: ">=2.0.2".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid application name (never all digits)
    pub fn app_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,20}"
    }

    /// Generate a deploy URL without a trailing separator
    pub fn deploy_url() -> impl Strategy<Value = String> {
        (
            prop_oneof!["https", "http"],
            "[a-z]{3,10}",
            "[a-z]{2,5}",
            "[a-z0-9-]{1,20}",
        )
            .prop_map(|(scheme, domain, tld, path)| format!("{scheme}://{domain}.{tld}/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::core::options::normalize_deploy_url;
    use crate::core::selector::AppSelector;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_app_name_generator_yields_names(name in app_name()) {
            prop_assert_eq!(AppSelector::parse(&name), AppSelector::Name(name.clone()));
        }

        #[test]
        fn test_deploy_url_generator_lacks_separator(url in deploy_url()) {
            prop_assert!(!url.ends_with('/'));
            prop_assert_eq!(normalize_deploy_url(url.clone()), format!("{url}/"));
        }
    }
}
