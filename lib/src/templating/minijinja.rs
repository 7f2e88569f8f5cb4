use std::path::Path;

use minijinja::{Environment, path_loader};
use minijinja::value::Value;
use serde::Serialize;

use crate::error::{ErrorKind, Result};
use crate::templating::{Context, Engine, EngineInit};

#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Result<Environment<'static>>,
}

fn try_init<G: Serialize>(root: &Path, globals: G) -> Result<Environment<'static>> {
    if !root.is_dir() {
        return Err(error! {
            "template directory does not exist",
            "path" => root.display(),
        }.with_kind(ErrorKind::Template));
    }

    let mut env = Environment::new();
    env.set_loader(path_loader(root));
    env.add_global("G", Value::from_serializable(&globals));
    Ok(env)
}

impl EngineInit for MiniJinjaEngine {
    type Engine = Self;

    fn init<G: Serialize>(root: &Path, globals: G) -> Self::Engine {
        MiniJinjaEngine { env: try_init(root, globals) }
    }
}

impl Engine for MiniJinjaEngine {
    fn render(&self, name: &str, context: &dyn Context) -> Result<String> {
        let env = self.env.as_ref().map_err(|e| e.clone())?;
        let template = env.get_template(name)?;
        Ok(template.render(context.to_value())?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde::Serialize;

    use super::*;
    use crate::error::ErrorKind;

    #[derive(Serialize)]
    struct Ctx<'a> {
        name: &'a str,
    }

    #[test]
    fn renders_with_includes_globals_and_escaping() {
        let root = std::env::temp_dir().join(format!("bandsite-minijinja-{}", std::process::id()));
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("partials/greet.html"), "Hi {{ name }}").unwrap();
        fs::write(root.join("page.html"), "{% include \"partials/greet.html\" %} from {{ G.site }}").unwrap();

        #[derive(Serialize)]
        struct Globals { site: &'static str }

        let engine = MiniJinjaEngine::init(&root, Globals { site: "LCB" });
        let html = engine.render("page.html", &Ctx { name: "<Ann>" }).unwrap();
        assert_eq!(html, "Hi &lt;Ann&gt; from LCB");

        let missing = engine.render("nope.html", &Ctx { name: "x" }).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::Template);
    }

    #[test]
    fn missing_template_root_fails_on_render() {
        let root = std::env::temp_dir().join("bandsite-minijinja-no-such-dir");
        let engine = MiniJinjaEngine::init(&root, ());
        let error = engine.render("index.html", &Ctx { name: "x" }).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Template);
        assert!(error.to_string().contains("template directory does not exist"));
    }
}
