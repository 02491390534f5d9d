//! # Generated Snippets
//!
//! File: cli/src/commands/install/snippets.rs
//!
//! ## Overview
//!
//! Embedded Tera templates for the generated routes module and for the
//! manual integration instructions printed when the router cannot be (or is
//! asked not to be) patched automatically.
//!
use super::plan::InstallPlan;
use crate::codemod::classifier::RouterStrategy;
use crate::codemod::patcher::router_package;
use crate::codemod::relative_specifier;
use crate::common::fs::io::read_file_to_string;
use crate::core::error::Result;
use crate::core::templating::render_snippet;
use std::collections::HashMap;

const ROUTES_MODULE_TEMPLATE: &str = r#"// Generated by dashgraft. Mounts the dashboard under {{ base_path }}.
import { {{ component }} } from "./index";

export const {{ routes_export }} = [
  {
    path: "{{ base_path }}/*",
    element: <{{ component }} />,
  },
];
"#;

const DATA_ROUTER_INSTRUCTIONS: &str = r#"In {{ file }}, import the dashboard routes:

  import { {{ routes_export }} } from "{{ routes_import }}";

then spread them first in the array passed to createBrowserRouter:

  createBrowserRouter([
    ...{{ routes_export }},
    // your existing routes
  ]);"#;

const COMPONENT_ROUTER_INSTRUCTIONS: &str = r#"In {{ file }}, import the dashboard component:

  import { Route } from "{{ router_package }}";
  import { {{ component }} } from "{{ component_import }}";

then add this as the first child of <Routes>:

  <Route path="{{ base_path }}/*" element={<{{ component }} />} />"#;

const FALLBACK_INSTRUCTIONS: &str = r#"Register the dashboard route yourself ({{ reason }}).
Paths below are relative to {{ file }}.

With createBrowserRouter:
  import { {{ routes_export }} } from "{{ routes_import }}";
  add ...{{ routes_export }} as the first element of the routes array.

With <BrowserRouter>:
  import { {{ component }} } from "{{ component_import }}";
  add <Route path="{{ base_path }}/*" element={<{{ component }} />} /> inside <Routes>."#;

/// Source of the generated routes module.
pub fn routes_module(context: &HashMap<String, String>) -> Result<String> {
    render_snippet("routes module", ROUTES_MODULE_TEMPLATE, context)
}

/// Manual steps for registering the dashboard, tailored to the classified
/// strategy. Import paths are relative to the file the user has to edit.
pub fn manual_instructions(plan: &InstallPlan) -> Result<String> {
    let anchor = plan
        .classification
        .target
        .clone()
        .unwrap_or_else(|| plan.entrypoint.clone());

    let mut context = plan.context.clone();
    context.insert("file".to_string(), plan.rel(&anchor));
    context.insert("reason".to_string(), plan.classification.reason.clone());
    context.insert(
        "routes_import".to_string(),
        relative_specifier(&anchor, &plan.integration.routes_module),
    );
    context.insert(
        "component_import".to_string(),
        relative_specifier(&anchor, &plan.integration.dashboard_dir),
    );

    // The package the automatic patch would import `Route` from.
    let router_source = read_file_to_string(&anchor).unwrap_or_default();
    context.insert(
        "router_package".to_string(),
        router_package(&router_source).to_string(),
    );

    let template = match plan.classification.strategy {
        RouterStrategy::CreateBrowserRouter => DATA_ROUTER_INSTRUCTIONS,
        RouterStrategy::BrowserRouter => COMPONENT_ROUTER_INSTRUCTIONS,
        RouterStrategy::Fallback => FALLBACK_INSTRUCTIONS,
    };
    render_snippet("manual instructions", template, &context)
}
