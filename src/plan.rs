//! Launch planning
//!
//! Decides which services start from the dev definition and which from
//! prod. A requested dev service always shadows the prod service of the
//! same name.

use crate::compose::ComposeConfig;

/// Which dev services were asked for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DevSelection {
    /// No dev services
    #[default]
    None,
    /// Every service of the dev definition
    All,
    /// These services, in request order
    Services(Vec<String>),
}

impl DevSelection {
    /// Interpret the `--dev` option: absent means none, `ALL` (any case)
    /// means all, otherwise a comma separated list.
    pub fn from_arg(arg: Option<&str>) -> Self {
        let Some(raw) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
            return DevSelection::None;
        };

        if raw.eq_ignore_ascii_case("all") {
            return DevSelection::All;
        }

        let mut names: Vec<String> = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            DevSelection::None
        } else {
            DevSelection::Services(names)
        }
    }
}

/// Services to launch from each definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchPlan {
    /// Dev services to start
    pub dev: Vec<String>,
    /// Prod services to start
    pub prod: Vec<String>,
}

impl LaunchPlan {
    /// Nothing to start
    pub fn is_empty(&self) -> bool {
        self.dev.is_empty() && self.prod.is_empty()
    }
}

/// Split the services of a project between dev and prod.
///
/// Explicitly requested names are not checked against the dev definition
/// here; that is the caller's job.
pub fn plan(dev: &ComposeConfig, prod: &ComposeConfig, selection: &DevSelection) -> LaunchPlan {
    let dev_to_start = match selection {
        DevSelection::None => Vec::new(),
        DevSelection::All => dev.service_names(),
        DevSelection::Services(names) => names.clone(),
    };

    let prod_to_start = prod
        .services
        .keys()
        .filter(|name| !dev_to_start.contains(name))
        .cloned()
        .collect();

    LaunchPlan {
        dev: dev_to_start,
        prod: prod_to_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ServiceConfig;

    fn config(services: &[&str]) -> ComposeConfig {
        let mut config = ComposeConfig::default();
        for name in services {
            config
                .services
                .insert(name.to_string(), ServiceConfig::image(name));
        }
        config
    }

    #[test]
    fn test_from_arg() {
        assert_eq!(DevSelection::from_arg(None), DevSelection::None);
        assert_eq!(DevSelection::from_arg(Some("  ")), DevSelection::None);
        assert_eq!(DevSelection::from_arg(Some(",,")), DevSelection::None);
        assert_eq!(DevSelection::from_arg(Some("ALL")), DevSelection::All);
        assert_eq!(DevSelection::from_arg(Some(" all ")), DevSelection::All);
        assert_eq!(
            DevSelection::from_arg(Some("worker, api,worker")),
            DevSelection::Services(vec!["worker".to_string(), "api".to_string()])
        );
    }

    #[test]
    fn test_no_dev_starts_all_prod() {
        let launch = plan(&config(&["api"]), &config(&["api", "db"]), &DevSelection::None);

        assert!(launch.dev.is_empty());
        assert_eq!(launch.prod, vec!["api", "db"]);
    }

    #[test]
    fn test_dev_shadows_prod() {
        let launch = plan(
            &config(&["api"]),
            &config(&["db", "api", "cache"]),
            &DevSelection::Services(vec!["api".to_string()]),
        );

        assert_eq!(launch.dev, vec!["api"]);
        assert_eq!(launch.prod, vec!["db", "cache"]);
    }

    #[test]
    fn test_all_dev_uses_declaration_order() {
        let launch = plan(
            &config(&["worker", "api"]),
            &config(&["api", "db", "worker"]),
            &DevSelection::All,
        );

        assert_eq!(launch.dev, vec!["worker", "api"]);
        assert_eq!(launch.prod, vec!["db"]);
    }

    #[test]
    fn test_request_order_and_disjointness() {
        let dev = config(&["a", "b", "c"]);
        let prod = config(&["c", "b", "a", "d"]);
        let selections = [
            DevSelection::None,
            DevSelection::All,
            DevSelection::Services(vec!["c".to_string(), "a".to_string()]),
            DevSelection::Services(vec!["b".to_string()]),
        ];

        for selection in &selections {
            let launch = plan(&dev, &prod, selection);
            assert!(launch.dev.iter().all(|s| !launch.prod.contains(s)));
            assert!(prod.services.keys().all(|s| launch.dev.contains(s) || launch.prod.contains(s)));
        }

        let launch = plan(
            &dev,
            &prod,
            &DevSelection::Services(vec!["c".to_string(), "a".to_string()]),
        );
        assert_eq!(launch.dev, vec!["c", "a"]);
        assert_eq!(launch.prod, vec!["b", "d"]);
    }

    #[test]
    fn test_empty_plan() {
        let launch = plan(&config(&[]), &config(&[]), &DevSelection::All);
        assert!(launch.is_empty());
    }
}
