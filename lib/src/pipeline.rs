use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::band::{load_instruments, load_members};
use crate::config::Config;
use crate::error::{Result, Chainable};
use crate::mirror::mirror;
use crate::palette::{extract_and_apply, Color};
use crate::render::{Page, Renderer};
use crate::templating::{Engine, EngineInit};

/// How far a build has progressed. Stages are reached strictly in order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    DataLoaded,
    PaletteApplied,
    AssetsCopied,
    PagesRendered,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::DataLoaded => "data loaded",
            Stage::PaletteApplied => "palette applied",
            Stage::AssetsCopied => "assets copied",
            Stage::PagesRendered => "pages rendered",
            Stage::Done => "done",
        };

        f.write_str(name)
    }
}

/// The outcome of a successful build.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub members: usize,
    pub instruments: usize,
    pub pages: Vec<PathBuf>,
    pub palette: Vec<Color>,
}

type SharedEnv = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds a site from its [`Config`].
#[derive(derive_more::Debug)]
pub struct Pipeline {
    config: Config,
    engine: Box<dyn Engine>,
    stage: Stage,
    #[debug(ignore)]
    env: Option<SharedEnv>,
}

impl Pipeline {
    /// Creates a pipeline rendering with the engine `E`, loading templates
    /// from the configured template directory. The settings are available to
    /// every template as `G`.
    pub fn new<E: EngineInit>(config: Config) -> Self {
        let templates = config.path(&config.settings.templates);
        let engine = E::init(&templates, &config.settings);
        Pipeline { config, engine: Box::new(engine), stage: Stage::Init, env: None }
    }

    /// Reads environment variables through `lookup` instead of the process
    /// environment.
    pub fn with_env<F>(mut self, lookup: F) -> Self
        where F: Fn(&str) -> Option<String> + Send + Sync + 'static
    {
        self.env = Some(Arc::new(lookup));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The last stage reached. After a failed [`run()`](Self::run), this is
    /// the stage that completed before the failure.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Runs every stage in order, stopping at the first failure.
    pub fn run(&mut self) -> Result<Summary> {
        self.stage = Stage::Init;
        let (config, settings) = (&self.config, &self.config.settings);
        let output = config.output_dir();

        let members = load_members(config.path(&settings.members))
            .chain_with(|| error!("failed to load band members"))?;

        let instruments = load_instruments(config.path(&settings.instruments), &members)
            .chain_with(|| error!("failed to load instruments"))?;

        fs::create_dir_all(&output).chain_with(|| error! {
            "failed to create output directory",
            "path" => output.display(),
        })?;

        tracing::info!(members = members.len(), instruments = instruments.len(), "loaded band data");
        self.stage = Stage::DataLoaded;

        let logo = config.path(&settings.logo);
        let stylesheet = config.path(&settings.stylesheet);
        let palette = extract_and_apply(&logo, &stylesheet, settings.palette_size)
            .chain_with(|| error!("failed to generate color scheme"))?;

        self.stage = Stage::PaletteApplied;

        mirror(config.path(&settings.static_dir), &output)
            .chain_with(|| error!("failed to copy static files"))?;

        mirror(config.path(&settings.assets_dir), output.join("assets"))
            .chain_with(|| error!("failed to copy assets"))?;

        self.stage = Stage::AssetsCopied;

        let mut renderer = Renderer::new(&*self.engine, settings, &output);
        if let Some(env) = &self.env {
            let env = env.clone();
            renderer = renderer.with_env(move |name| env(name));
        }

        let mut queue: Vec<Page<'_>> = Page::FIXED.to_vec();
        queue.extend(instruments.values().map(Page::Instrument));

        let mut pages = vec![];
        for page in queue {
            let path = renderer.render_page(page, &instruments)
                .chain_with(|| error!("failed to generate page", "page" => page.file_name()))?;

            pages.push(path);
        }

        self.stage = Stage::PagesRendered;

        let summary = Summary {
            members: members.len(),
            instruments: instruments.len(),
            pages,
            palette,
        };

        self.stage = Stage::Done;
        tracing::info!(pages = summary.pages.len(), "site generated in {}", output.display());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Init < Stage::DataLoaded);
        assert!(Stage::DataLoaded < Stage::PaletteApplied);
        assert!(Stage::PaletteApplied < Stage::AssetsCopied);
        assert!(Stage::AssetsCopied < Stage::PagesRendered);
        assert!(Stage::PagesRendered < Stage::Done);
        assert_eq!(Stage::PaletteApplied.to_string(), "palette applied");
    }
}
