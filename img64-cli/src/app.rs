// ABOUTME: Conversion workflow for the CLI: input loading, renderer setup and HTML output
// ABOUTME: Combines config file values with command-line overrides

use crate::cli::Cli;
use crate::config::Config;
use anyhow::{Context, Result};
use img64::constants::{prefixes, remote};
use img64::{
    Markdown, ParentPathResolver, RemoteFileReader, RemoteReaderConfig, RendererConfig,
    UrlRootResolver,
};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Where the markdown comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Stdin,
    Url(Url),
}

impl Input {
    pub fn parse(value: &str) -> Result<Self> {
        if value == "-" {
            return Ok(Input::Stdin);
        }
        if prefixes::is_remote(value) {
            let url = Url::parse(value).with_context(|| format!("Invalid input URL '{}'", value))?;
            return Ok(Input::Url(url));
        }
        Ok(Input::File(PathBuf::from(value)))
    }

    /// Directory or URL that relative image references are resolved against
    /// when nothing else is configured
    fn default_resolver_root(&self) -> Option<Root> {
        match self {
            Input::File(path) => {
                let parent = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                Some(Root::Dir(parent.to_path_buf()))
            }
            Input::Url(url) => Some(Root::Url(url.clone())),
            Input::Stdin => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Root {
    Dir(PathBuf),
    Url(Url),
}

/// Effective settings after applying CLI flags over config values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub parent_path: Option<PathBuf>,
    pub base_url: Option<Url>,
    pub allow_remote: bool,
    pub unsafe_html: bool,
    pub xhtml: bool,
    pub timeout: Duration,
    pub max_image_size: u64,
}

impl Settings {
    pub fn from_sources(config: &Config, cli: &Cli) -> Result<Self> {
        let (parent_path, base_url) = match (&cli.parent_path, &cli.base_url) {
            (Some(path), _) => (Some(path.clone()), None),
            (None, Some(url)) => (None, Some(url.clone())),
            (None, None) => {
                let base_url = config
                    .base_url
                    .as_deref()
                    .map(Url::parse)
                    .transpose()
                    .context("Invalid base_url in config")?;
                (config.parent_path.clone(), base_url)
            }
        };

        let timeout = cli
            .timeout
            .or(config.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(remote::DEFAULT_TIMEOUT);

        Ok(Self {
            parent_path,
            base_url,
            allow_remote: cli.allow_remote || config.allow_remote.unwrap_or(false),
            unsafe_html: cli.unsafe_html || config.unsafe_html.unwrap_or(false),
            xhtml: cli.xhtml || config.xhtml.unwrap_or(false),
            timeout,
            max_image_size: cli
                .max_size
                .or_else(|| config.max_image_size_bytes())
                .unwrap_or(remote::DEFAULT_MAX_SIZE_BYTES),
        })
    }

    fn remote_config(&self) -> RemoteReaderConfig {
        RemoteReaderConfig::builder()
            .timeout(self.timeout)
            .max_size_bytes(self.max_image_size)
            .build()
    }

    /// Builds the renderer configuration for `input`
    pub fn renderer_config(&self, input: &Input) -> Result<RendererConfig> {
        let mut builder = RendererConfig::builder()
            .allow_unsafe(self.unsafe_html)
            .xhtml(self.xhtml);

        let root = match (&self.parent_path, &self.base_url) {
            (Some(path), _) => Some(Root::Dir(path.clone())),
            (None, Some(url)) => Some(Root::Url(url.clone())),
            (None, None) => input.default_resolver_root(),
        };

        builder = match root {
            Some(Root::Dir(dir)) => builder.path_resolver(ParentPathResolver::new(dir)),
            Some(Root::Url(url)) => builder.path_resolver(UrlRootResolver::new(url)),
            None => builder,
        };

        // images of a remote document are remote themselves
        if self.allow_remote || matches!(input, Input::Url(_)) {
            let reader = RemoteFileReader::new(self.remote_config())
                .context("Failed to create remote image reader")?;
            builder = builder.file_reader(reader);
        }

        Ok(builder.build())
    }
}

/// Loads the markdown source
pub fn read_input(input: &Input, settings: &Settings) -> Result<String> {
    match input {
        Input::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file: {}", path.display())),
        Input::Stdin => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read markdown from stdin")?;
            Ok(source)
        }
        Input::Url(url) => {
            let client = reqwest::blocking::Client::builder()
                .timeout(settings.timeout)
                .user_agent(remote::USER_AGENT)
                .build()
                .context("Failed to create HTTP client")?;

            log::debug!("Fetching markdown from {}", url);
            client
                .get(url.as_str())
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .with_context(|| format!("Failed to fetch markdown from {}", url))
        }
    }
}

/// Converts `source` and writes the HTML to `writer`
pub fn convert<W: Write>(source: &str, config: RendererConfig, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    Markdown::from(config)
        .convert_to_writer(source, &mut writer)
        .context("Failed to write HTML")?;
    writer.flush().context("Failed to write HTML")?;
    Ok(())
}

pub fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let settings = Settings::from_sources(&config, cli)?;
    log::debug!("Effective settings: {:?}", settings);

    let input = Input::parse(&cli.input)?;
    let source = read_input(&input, &settings)?;
    let renderer_config = settings.renderer_config(&input)?;

    match &cli.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            convert(&source, renderer_config, file)
        }
        None => convert(&source, renderer_config, std::io::stdout().lock()),
    }
}
