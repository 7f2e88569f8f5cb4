use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::band::{Instrument, InstrumentMap};
use crate::config::Settings;
use crate::error::{Result, Chainable};
use crate::format::Sink;
use crate::templating::Engine;
use crate::util::page_file_name;

/// A page of the site. Each kind renders `<kind>.html` from the template of
/// the same name, except instrument pages, which are named after their
/// instrument.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Page<'a> {
    Index,
    About,
    Membership,
    Rehearsals,
    Calendar,
    Error,
    Instrument(&'a Instrument),
}

impl Page<'_> {
    /// The pages every site has, in build order.
    pub const FIXED: [Page<'static>; 6] = [
        Page::Index,
        Page::About,
        Page::Membership,
        Page::Rehearsals,
        Page::Calendar,
        Page::Error,
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            Page::Index => "index",
            Page::About => "about",
            Page::Membership => "membership",
            Page::Rehearsals => "rehearsals",
            Page::Calendar => "calendar",
            Page::Error => "error",
            Page::Instrument(_) => "instrument",
        }
    }

    pub fn template_name(&self) -> String {
        format!("{}.html", self.kind())
    }

    pub fn file_name(&self) -> Cow<'static, str> {
        match self {
            Page::Instrument(instrument) => page_file_name(&instrument.name).into(),
            _ => self.template_name().into(),
        }
    }
}

/// Everything a page template can see.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub title: &'a str,
    pub instrument_sections: &'a InstrumentMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<&'a Instrument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmaps_api_key: Option<String>,
    pub google_analytics_id: String,
}

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Renders pages into an output directory.
#[derive(derive_more::Debug)]
pub struct Renderer<'a> {
    engine: &'a dyn Engine,
    settings: &'a Settings,
    output: PathBuf,
    #[debug(ignore)]
    env: Box<EnvLookup>,
}

impl<'a> Renderer<'a> {
    pub fn new<P: AsRef<Path>>(engine: &'a dyn Engine, settings: &'a Settings, output: P) -> Self {
        Renderer {
            engine,
            settings,
            output: output.as_ref().to_path_buf(),
            env: Box::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Replaces the process environment as the source of the analytics id
    /// and maps key.
    pub fn with_env<F>(mut self, lookup: F) -> Self
        where F: Fn(&str) -> Option<String> + Send + Sync + 'static
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn context<'p>(&'p self, page: Page<'p>, instruments: &'p InstrumentMap) -> PageContext<'p> {
        let vars = &self.settings.env;
        let mut context = PageContext {
            title: &self.settings.title,
            instrument_sections: instruments,
            instrument: None,
            calendar_url: None,
            map_url: None,
            gmaps_api_key: None,
            google_analytics_id: (self.env)(vars.analytics.as_str()).unwrap_or_default(),
        };

        match page {
            Page::Instrument(instrument) => context.instrument = Some(instrument),
            Page::Calendar => context.calendar_url = Some(self.settings.calendar_url.as_str()),
            Page::About => context.map_url = Some(self.settings.map_url.as_str()),
            Page::Rehearsals => {
                let key = (self.env)(vars.maps_key.as_str()).unwrap_or_else(|| {
                    tracing::warn!("{} is not set; the rehearsals map will not load", vars.maps_key);
                    String::new()
                });

                context.gmaps_api_key = Some(key);
            }
            _ => {}
        }

        context
    }

    /// Renders `page` and writes it to the output directory, returning the
    /// path written.
    pub fn render_page(&self, page: Page<'_>, instruments: &InstrumentMap) -> Result<PathBuf> {
        let template = page.template_name();
        let output = self.output.join(&*page.file_name());
        let context = self.context(page, instruments);
        let html = self.engine.render(&template, &context).chain_with(|| error! {
            "failed to render page",
            "template" => &template,
            "output path" => output.display(),
        })?;

        output.write(html)?;
        tracing::info!("generated {}", output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::band::Member;
    use crate::error::ErrorKind;
    use crate::templating::EngineInit;
    use crate::templating::minijinja::MiniJinjaEngine;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bandsite-render-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn instruments() -> InstrumentMap {
        let roster = [
            Member { name: "Ann".into(), section: "French Horn".into(), day_job: "Nurse".into() },
            Member { name: "Bob".into(), section: "Alto Sax".into(), day_job: "Chef".into() },
        ];

        let mut map = InstrumentMap::new();
        for name in ["French Horn", "Alto Sax"] {
            let mut instrument = Instrument { name: name.into(), ..Default::default() };
            instrument.resolve(&roster);
            map.insert(name.into(), instrument);
        }

        map
    }

    fn templates(root: &Path) {
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("partials/nav.html"),
            "{% for name, section in instrument_sections|dictsort %}[{{ section.url }}]{% endfor %}").unwrap();

        for kind in ["index", "about", "membership", "rehearsals", "calendar", "error"] {
            fs::write(root.join(format!("{kind}.html")), format!(
                "{kind}|{{{{ title }}}}|{{% include \"partials/nav.html\" %}}|{{{{ map_url }}}}|{{{{ calendar_url }}}}|{{{{ gmaps_api_key }}}}|{{{{ google_analytics_id }}}}"
            )).unwrap();
        }

        fs::write(root.join("instrument.html"),
            "{{ instrument.name }}:{% for m in instrument.members %}{{ m.name }}({{ m.day_job }}){% endfor %}").unwrap();
    }

    #[test]
    fn file_names_follow_page_kind() {
        let map = instruments();
        let names: Vec<_> = Page::FIXED.iter().map(|p| p.file_name()).collect();
        assert_eq!(names, ["index.html", "about.html", "membership.html", "rehearsals.html", "calendar.html", "error.html"]);

        let horn = Page::Instrument(&map["French Horn"]);
        assert_eq!(horn.template_name(), "instrument.html");
        assert_eq!(horn.file_name(), "french_horn.html");
    }

    #[test]
    fn pages_bind_their_own_fields() {
        let root = temp_dir("fields");
        templates(&root.join("templates"));

        let settings = Settings {
            title: "Test Band".into(),
            calendar_url: "calendar-embed".into(),
            map_url: "map-embed".into(),
            ..Settings::default()
        };

        let engine = MiniJinjaEngine::init(&root.join("templates"), ());
        let renderer = Renderer::new(&engine, &settings, &root)
            .with_env(|name| match name {
                "LCB_GOOGLE_ANALYTICS_ID" => Some("G-123".into()),
                "LCB_GMAP_KEY" => Some("maps-key".into()),
                _ => None,
            });

        let map = instruments();
        for page in Page::FIXED {
            renderer.render_page(page, &map).unwrap();
        }

        let read = |name: &str| fs::read_to_string(root.join(name)).unwrap();
        let nav = "[alto_sax.html][french_horn.html]";
        assert_eq!(read("index.html"), format!("index|Test Band|{nav}||||G-123"));
        assert_eq!(read("about.html"), format!("about|Test Band|{nav}|map-embed|||G-123"));
        assert_eq!(read("calendar.html"), format!("calendar|Test Band|{nav}||calendar-embed||G-123"));
        assert_eq!(read("rehearsals.html"), format!("rehearsals|Test Band|{nav}|||maps-key|G-123"));
    }

    #[test]
    fn instrument_page_is_named_after_instrument() {
        let root = temp_dir("instrument");
        templates(&root.join("templates"));

        let settings = Settings::default();
        let engine = MiniJinjaEngine::init(&root.join("templates"), ());
        let renderer = Renderer::new(&engine, &settings, &root).with_env(|_| None);

        let map = instruments();
        let path = renderer.render_page(Page::Instrument(&map["French Horn"]), &map).unwrap();
        assert_eq!(path, root.join("french_horn.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "French Horn:Ann(Nurse)");
    }

    #[test]
    fn unset_environment_renders_empty() {
        let root = temp_dir("unset-env");
        templates(&root.join("templates"));

        let settings = Settings::default();
        let engine = MiniJinjaEngine::init(&root.join("templates"), ());
        let renderer = Renderer::new(&engine, &settings, &root).with_env(|_| None);

        let map = InstrumentMap::new();
        renderer.render_page(Page::Rehearsals, &map).unwrap();
        let html = fs::read_to_string(root.join("rehearsals.html")).unwrap();
        assert_eq!(html, "rehearsals|Lexington Community Band|||||");
    }

    #[test]
    fn missing_template_is_a_template_error() {
        let root = temp_dir("missing-template");
        fs::create_dir_all(root.join("templates")).unwrap();

        let settings = Settings::default();
        let engine = MiniJinjaEngine::init(&root.join("templates"), ());
        let renderer = Renderer::new(&engine, &settings, &root);

        let error = renderer.render_page(Page::Index, &InstrumentMap::new()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Template);
        assert!(!root.join("index.html").exists());
    }
}
