//! Asset references resolved to URLs and rendered as HTML.
//!
//! A [`Registry`] holds named [`Mapper`]s. A reference such as
//! `vite:main.js` picks the `vite` mapper, which turns `main.js` into an
//! [`Asset`]: a script, stylesheet, image, font, audio or video file, or a
//! bundler entry point with its dependencies. The [`Runtime`] renders
//! assets as HTML and [`Template`] expands asset tags in markup.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.add_mapper("default", FilesystemMapper::new("/assets", "www/assets"))?;
//!
//! let runtime = Runtime::new(Arc::new(registry));
//! let asset = runtime.asset("app.js", &Options::new())?;
//! println!("{}", runtime.render_asset(&asset)?);
//! ```

pub mod logger;

pub mod asset;
pub mod config;
pub mod error;
pub mod helpers;
pub mod html;
pub mod mapper;
pub mod registry;
pub mod runtime;
pub mod template;

pub use asset::{Asset, HtmlRenderable};
pub use config::{AssetsConfig, ConfigError};
pub use error::{AssetError, Result};
pub use mapper::{FilesystemMapper, Mapper, Options, ViteMapper};
pub use registry::{QualifiedRef, Registry};
pub use runtime::{AssetRef, Runtime};
pub use template::{Template, TemplateError};
