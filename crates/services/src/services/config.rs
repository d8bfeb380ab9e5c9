//! Workflow endpoint configuration.
//!
//! URLs are resolved from the environment on every request so a missing
//! variable fails only the endpoint that needs it.

pub const GENERATE_TICKETS_URL_VAR: &str = "N8N_GENERATE_TICKETS_URL";
pub const LEGACY_GENERATE_TICKETS_URL_VAR: &str = "NEXT_PUBLIC_N8N_GENERATE_TICKETS_URL";
pub const PLAN_SPRINT_URL_VAR: &str = "N8N_PLAN_SPRINT_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowUrls {
    pub generate_tickets: Option<String>,
    pub plan_sprint: Option<String>,
}

impl WorkflowUrls {
    /// Resolve URLs through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            generate_tickets: non_blank(GENERATE_TICKETS_URL_VAR)
                .or_else(|| non_blank(LEGACY_GENERATE_TICKETS_URL_VAR)),
            plan_sprint: non_blank(PLAN_SPRINT_URL_VAR),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[derive(Debug, Clone, Default)]
pub enum WorkflowSettings {
    /// Read the process environment on each call.
    #[default]
    FromEnv,
    Fixed(WorkflowUrls),
}

impl WorkflowSettings {
    pub fn urls(&self) -> WorkflowUrls {
        match self {
            WorkflowSettings::FromEnv => WorkflowUrls::from_env(),
            WorkflowSettings::Fixed(urls) => urls.clone(),
        }
    }

    pub fn generate_tickets_url(&self) -> Option<String> {
        self.urls().generate_tickets
    }

    pub fn plan_sprint_url(&self) -> Option<String> {
        self.urls().plan_sprint
    }
}
