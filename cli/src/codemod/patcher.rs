//! # Router Patcher
//!
//! File: cli/src/codemod/patcher.rs
//!
//! ## Overview
//!
//! Registers the dashboard route in the file chosen by the classifier.
//!
//! - **createBrowserRouter**: `...<routesExport>` becomes the first element
//!   of the array passed to `createBrowserRouter(`, and the routes export is
//!   imported from the generated routes module.
//! - **browserRouter**: `<Route path="<base>/*" element={<Component />} />`
//!   becomes the first child of `<Routes>`. `BrowserRouter`, `Routes` and
//!   `Route` are imported where not already bound, as is the dashboard
//!   component.
//!
//! The patch is idempotent: if the file already mentions the routes export
//! or renders the component, it is reported as already integrated and left
//! alone. The structural edit and the import edits are applied in memory
//! and written once, through the backup manager, so a patched file has
//! exactly one backup per run.
//!
//! Failing to find the structural anchor is not an error: the result says
//! so and the caller prints manual instructions.
//!
use crate::codemod::classifier::{
    data_router_array_regex, routes_open_regex, Classification, RouterStrategy,
};
use crate::codemod::imports::{analyze, Specifier};
use crate::codemod::injector::ensure_named_imports;
use crate::codemod::relative_specifier;
use crate::codemod::text::{leading_whitespace, line_ending, splice};
use crate::common::fs::backup::BackupManager;
use crate::common::fs::io::read_file_to_string;
use crate::core::error::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What to register and where the dashboard lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterIntegration {
    pub component: String,
    pub routes_export: String,
    pub base_path: String,
    /// Absolute path of the installed dashboard directory.
    pub dashboard_dir: PathBuf,
    /// Absolute path of the generated routes module, without extension.
    pub routes_module: PathBuf,
}

impl RouterIntegration {
    /// The `<Route>` element registered under `<Routes>`.
    pub fn route_element(&self) -> String {
        format!(
            "<Route path=\"{}/*\" element={{<{} />}} />",
            self.base_path, self.component
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    pub strategy: RouterStrategy,
    pub file: Option<PathBuf>,
    pub success: bool,
    pub already_integrated: bool,
    pub backup_path: Option<PathBuf>,
    pub message: String,
}

impl PatchResult {
    fn unpatched(classification: &Classification, message: String) -> Self {
        PatchResult {
            strategy: classification.strategy,
            file: classification.target.clone(),
            success: false,
            already_integrated: false,
            backup_path: None,
            message,
        }
    }
}

/// Applies the strategy in `classification` to its target file.
pub fn patch_router(
    classification: &Classification,
    integration: &RouterIntegration,
    backups: &BackupManager,
) -> Result<PatchResult> {
    let target = match (&classification.strategy, &classification.target) {
        (RouterStrategy::Fallback, _) | (_, None) => {
            return Ok(PatchResult::unpatched(
                classification,
                format!("Router not patched: {}", classification.reason),
            ));
        }
        (_, Some(target)) => target,
    };

    let original = read_file_to_string(target)?;
    if is_integrated(&original, integration) {
        info!("{} already registers the dashboard", target.display());
        let mut result = PatchResult::unpatched(
            classification,
            format!("{} already registers the dashboard route", target.display()),
        );
        result.already_integrated = true;
        return Ok(result);
    }

    let structural = match classification.strategy {
        RouterStrategy::CreateBrowserRouter => {
            insert_route_spread(&original, &integration.routes_export)
        }
        _ => insert_route_element(&original, &integration.route_element()),
    };
    let patched = match structural {
        Some(text) => text,
        None => {
            let anchor = match classification.strategy {
                RouterStrategy::CreateBrowserRouter => "createBrowserRouter([",
                _ => "<Routes>",
            };
            warn!("No {} anchor found in {}", anchor, target.display());
            return Ok(PatchResult::unpatched(
                classification,
                format!("Could not find `{}` in {}", anchor, target.display()),
            ));
        }
    };

    let with_imports = match classification.strategy {
        RouterStrategy::CreateBrowserRouter => {
            let module = relative_specifier(target, &integration.routes_module);
            ensure_named_imports(
                &patched,
                &module,
                &[Specifier::value(integration.routes_export.as_str())],
            )
            .text
        }
        _ => {
            let router_module = router_package(&patched);
            let unbound = unbound_router_components(&patched);
            let step = ensure_named_imports(&patched, router_module, &unbound);
            let module = relative_specifier(target, &integration.dashboard_dir);
            ensure_named_imports(
                &step.text,
                &module,
                &[Specifier::value(integration.component.as_str())],
            )
            .text
        }
    };

    let outcome = backups.write_guarded(target, &with_imports)?;
    let backup_path = outcome.backup().map(|record| record.backup_path.clone());
    debug!("Patched {} (backup: {:?})", target.display(), backup_path);

    Ok(PatchResult {
        strategy: classification.strategy,
        file: Some(target.clone()),
        success: true,
        already_integrated: false,
        backup_path,
        message: format!(
            "Registered {}/* in {}",
            integration.base_path,
            target.display()
        ),
    })
}

/// True if the routes export is referenced or the component is rendered.
pub fn is_integrated(text: &str, integration: &RouterIntegration) -> bool {
    contains_identifier(text, &integration.routes_export)
        || renders_component(text, &integration.component)
}

/// Inserts `...routes_export` as the first element of the
/// `createBrowserRouter([` array. `None` if there is no such array.
pub fn insert_route_spread(text: &str, routes_export: &str) -> Option<String> {
    let anchor = data_router_array_regex().find(text)?;
    let pos = anchor.end();
    let newline = line_ending(text);
    let rest = &text[pos..];
    let rest_of_line = rest.split('\n').next().unwrap_or("").trim_end_matches('\r');
    let spread = format!("...{routes_export}");

    if rest_of_line.trim().is_empty() {
        let next_line = rest
            .split('\n')
            .skip(1)
            .map(|line| line.trim_end_matches('\r'))
            .find(|line| !line.trim().is_empty());
        let indent = match next_line {
            Some(line) if line.trim_start().starts_with(']') => {
                let base = leading_whitespace(line);
                format!("{base}{}", indent_unit(base))
            }
            Some(line) => leading_whitespace(line).to_string(),
            None => "  ".to_string(),
        };
        let at = pos + rest_of_line.len();
        return Some(splice(text, at..at, &format!("{newline}{indent}{spread},")));
    }

    let insertion = if rest_of_line.trim_start().starts_with(']') {
        spread
    } else {
        format!("{spread}, ")
    };
    Some(splice(text, pos..pos, &insertion))
}

/// Inserts `element` as the first child of the first non-self-closing
/// `<Routes>`. `None` if there is no such element.
pub fn insert_route_element(text: &str, element: &str) -> Option<String> {
    let open = routes_open_regex()
        .find_iter(text)
        .find(|m| !m.as_str().ends_with("/>"))?;
    let newline = line_ending(text);
    let line_start = text[..open.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let indent = leading_whitespace(&text[line_start..open.start()]);
    let child = format!("{indent}{}", indent_unit(indent));

    let rest_of_line = text[open.end()..]
        .split('\n')
        .next()
        .unwrap_or("")
        .trim_end_matches('\r');
    let insertion = if rest_of_line.trim().is_empty() {
        format!("{newline}{child}{element}")
    } else {
        format!("{newline}{child}{element}{newline}{child}")
    };
    Some(splice(text, open.end()..open.end(), &insertion))
}

/// One indentation level in the style of `indent`.
fn indent_unit(indent: &str) -> &'static str {
    if indent.contains('\t') {
        "\t"
    } else {
        "  "
    }
}

/// Components rendered by a component-router file.
const ROUTER_COMPONENTS: &[&str] = &["BrowserRouter", "Routes", "Route"];

/// The router components no import statement in `text` binds yet.
fn unbound_router_components(text: &str) -> Vec<Specifier> {
    let analysis = analyze(text);
    ROUTER_COMPONENTS
        .iter()
        .filter(|name| {
            !analysis.statements.iter().any(|stmt| {
                stmt.specifiers.iter().any(|s| !s.is_type && s.name == **name)
                    || stmt.default_binding.as_deref() == Some(**name)
                    || stmt.namespace.as_deref() == Some(**name)
            })
        })
        .map(|name| Specifier::value(*name))
        .collect()
}

/// `react-router` when the file imports from it and not from
/// `react-router-dom` (v7 style), `react-router-dom` otherwise.
pub fn router_package(text: &str) -> &'static str {
    let analysis = analyze(text);
    let uses_core = analysis.from_module("react-router").next().is_some();
    let uses_dom = analysis.from_module("react-router-dom").next().is_some();
    if uses_core && !uses_dom {
        "react-router"
    } else {
        "react-router-dom"
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn contains_identifier(text: &str, ident: &str) -> bool {
    text.match_indices(ident).any(|(i, _)| {
        let before = text[..i].chars().next_back();
        let after = text[i + ident.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

fn renders_component(text: &str, component: &str) -> bool {
    let tag = format!("<{component}");
    text.match_indices(&tag).any(|(i, _)| {
        text[i + tag.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '/' || c == '>')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemod::classifier::RouterStrategy;
    use std::fs;
    use tempfile::tempdir;

    fn integration(root: &std::path::Path) -> RouterIntegration {
        RouterIntegration {
            component: "DashboardApp".into(),
            routes_export: "dashboardRoutes".into(),
            base_path: "/app".into(),
            dashboard_dir: root.join("src/dashboard"),
            routes_module: root.join("src/dashboard/routes"),
        }
    }

    #[test]
    fn test_spread_multiline_uses_element_indent() {
        let text = "const router = createBrowserRouter([\n    { path: \"/\", element: <Home /> },\n]);\n";
        assert_eq!(
            insert_route_spread(text, "dashboardRoutes").unwrap(),
            "const router = createBrowserRouter([\n    ...dashboardRoutes,\n    { path: \"/\", element: <Home /> },\n]);\n"
        );
    }

    #[test]
    fn test_spread_inline_and_empty() {
        assert_eq!(
            insert_route_spread("createBrowserRouter([{ path: '/' }])", "r").unwrap(),
            "createBrowserRouter([...r, { path: '/' }])"
        );
        assert_eq!(
            insert_route_spread("createBrowserRouter([])", "r").unwrap(),
            "createBrowserRouter([...r])"
        );
        assert_eq!(
            insert_route_spread("createBrowserRouter([\n])", "r").unwrap(),
            "createBrowserRouter([\n  ...r,\n])"
        );
        assert!(insert_route_spread("createBrowserRouter(routes)", "r").is_none());
    }

    #[test]
    fn test_route_element_first_child_with_indent() {
        let text = "    <Routes>\n      <Route path=\"/\" element={<Home />} />\n    </Routes>\n";
        let out = insert_route_element(text, "<X />").unwrap();
        assert_eq!(
            out,
            "    <Routes>\n      <X />\n      <Route path=\"/\" element={<Home />} />\n    </Routes>\n"
        );
    }

    #[test]
    fn test_route_element_tabs_and_same_line_content() {
        let text = "\t<Routes location={loc}><Route path=\"/\" /></Routes>\n";
        let out = insert_route_element(text, "<X />").unwrap();
        assert_eq!(
            out,
            "\t<Routes location={loc}>\n\t\t<X />\n\t\t<Route path=\"/\" /></Routes>\n"
        );
        assert!(insert_route_element("<Routes />", "<X />").is_none());
    }

    #[test]
    fn test_patch_component_router_end_to_end() -> Result<()> {
        let dir = tempdir()?;
        let app = dir.path().join("src/App.tsx");
        fs::create_dir_all(app.parent().unwrap())?;
        let original = "import { BrowserRouter, Routes } from \"react-router-dom\";\nimport Home from \"./Home\";\n\nexport default function App() {\n  return (\n    <BrowserRouter>\n      <Routes>\n        <Route path=\"/\" element={<Home />} />\n      </Routes>\n    </BrowserRouter>\n  );\n}\n";
        fs::write(&app, original)?;

        let classification = Classification {
            strategy: RouterStrategy::BrowserRouter,
            target: Some(app.clone()),
            reason: String::new(),
        };
        let backups = BackupManager::new();
        let result = patch_router(&classification, &integration(dir.path()), &backups)?;
        assert!(result.success);
        let backup = result.backup_path.clone().expect("backup must exist");
        assert_eq!(fs::read_to_string(&backup)?, original);

        let patched = fs::read_to_string(&app)?;
        assert!(patched.starts_with(
            "import { BrowserRouter, Routes, Route } from \"react-router-dom\";\nimport Home from \"./Home\";\nimport { DashboardApp } from \"./dashboard\";\n"
        ));
        assert!(patched.contains(
            "      <Routes>\n        <Route path=\"/app/*\" element={<DashboardApp />} />\n        <Route path=\"/\""
        ));

        let second = patch_router(&classification, &integration(dir.path()), &backups)?;
        assert!(!second.success);
        assert!(second.already_integrated);
        assert!(second.backup_path.is_none());
        assert_eq!(fs::read_to_string(&app)?, patched);
        Ok(())
    }

    fn component_router_at(path: &std::path::Path) -> Classification {
        Classification {
            strategy: RouterStrategy::BrowserRouter,
            target: Some(path.to_path_buf()),
            reason: String::new(),
        }
    }

    #[test]
    fn test_patch_adds_missing_router_import() -> Result<()> {
        let dir = tempdir()?;
        let app = dir.path().join("src/App.tsx");
        fs::create_dir_all(app.parent().unwrap())?;
        fs::write(
            &app,
            "export default () => <BrowserRouter><Routes><Route path=\"/\" element={<Index/>} /></Routes></BrowserRouter>;\n",
        )?;

        let result = patch_router(
            &component_router_at(&app),
            &integration(dir.path()),
            &BackupManager::new(),
        )?;
        assert!(result.success);
        let patched = fs::read_to_string(&app)?;
        assert_eq!(patched.matches("from \"react-router-dom\"").count(), 1);
        assert!(patched.starts_with(
            "import { BrowserRouter, Routes, Route } from \"react-router-dom\";\nimport { DashboardApp } from \"./dashboard\";\n"
        ));
        assert!(patched.contains("<Routes>\n  <Route path=\"/app/*\" element={<DashboardApp />} />"));
        Ok(())
    }

    #[test]
    fn test_patch_ignores_import_text_inside_jsx() -> Result<()> {
        let dir = tempdir()?;
        let app = dir.path().join("src/App.tsx");
        fs::create_dir_all(app.parent().unwrap())?;
        let original = "import { BrowserRouter, Routes, Route } from \"react-router-dom\";\n\nexport default function App() {\n  return (\n    <BrowserRouter>\n      <p>\n        import your data below\n      </p>\n      <Routes>\n        <Route path=\"/\" element={<Home />} />\n      </Routes>\n    </BrowserRouter>\n  );\n}\n";
        fs::write(&app, original)?;

        let result = patch_router(
            &component_router_at(&app),
            &integration(dir.path()),
            &BackupManager::new(),
        )?;
        assert!(result.success);
        let patched = fs::read_to_string(&app)?;
        assert_eq!(patched.matches("from \"react-router-dom\"").count(), 1);
        assert!(patched.starts_with(
            "import { BrowserRouter, Routes, Route } from \"react-router-dom\";\nimport { DashboardApp } from \"./dashboard\";\n"
        ));
        Ok(())
    }

    #[test]
    fn test_router_package_prefers_core_only_imports() {
        assert_eq!(router_package("import { Routes } from \"react-router\";\n"), "react-router");
        assert_eq!(
            router_package("import { Routes } from \"react-router\";\nimport { Link } from \"react-router-dom\";\n"),
            "react-router-dom"
        );
        assert_eq!(router_package("const x = 1;\n"), "react-router-dom");
    }

    #[test]
    fn test_patch_data_router_in_router_module() -> Result<()> {
        let dir = tempdir()?;
        let router = dir.path().join("src/router/index.tsx");
        fs::create_dir_all(router.parent().unwrap())?;
        fs::write(
            &router,
            "import { createBrowserRouter } from 'react-router-dom';\n\nexport const router = createBrowserRouter([\n  { path: '/', element: <Home /> },\n]);\n",
        )?;
        let classification = Classification {
            strategy: RouterStrategy::CreateBrowserRouter,
            target: Some(router.clone()),
            reason: String::new(),
        };
        let result = patch_router(&classification, &integration(dir.path()), &BackupManager::new())?;
        assert!(result.success);
        assert_eq!(
            fs::read_to_string(&router)?,
            "import { createBrowserRouter } from 'react-router-dom';\nimport { dashboardRoutes } from '../dashboard/routes';\n\nexport const router = createBrowserRouter([\n  ...dashboardRoutes,\n  { path: '/', element: <Home /> },\n]);\n"
        );
        Ok(())
    }

    #[test]
    fn test_missing_anchor_is_reported_not_fatal() -> Result<()> {
        let dir = tempdir()?;
        let main = dir.path().join("src/main.tsx");
        fs::create_dir_all(main.parent().unwrap())?;
        let text = "const router = createBrowserRouter(routes);\nrender(<RouterProvider router={router} />);\n";
        fs::write(&main, text)?;
        let classification = Classification {
            strategy: RouterStrategy::CreateBrowserRouter,
            target: Some(main.clone()),
            reason: String::new(),
        };
        let result = patch_router(&classification, &integration(dir.path()), &BackupManager::new())?;
        assert!(!result.success);
        assert!(!result.already_integrated);
        assert!(result.message.contains("createBrowserRouter(["));
        assert_eq!(fs::read_to_string(&main)?, text);
        Ok(())
    }

    #[test]
    fn test_identifier_boundaries() {
        assert!(contains_identifier("...dashboardRoutes,", "dashboardRoutes"));
        assert!(!contains_identifier("myDashboardRoutes", "DashboardRoutes"));
        assert!(renders_component("<DashboardApp />", "DashboardApp"));
        assert!(!renders_component("<DashboardAppShell />", "DashboardApp"));
    }
}
