//! Tera rendering engine: [`Envelope`] enum and [`Renderer`].
//!
//! # Templates
//!
//! | Document                | Template                               |
//! |-------------------------|----------------------------------------|
//! | Manifest                | `package.xml.tera`                     |
//! | retrieve                | `soap/retrieve.xml.tera`               |
//! | checkRetrieveStatus     | `soap/check_retrieve_status.xml.tera`  |
//! | deploy                  | `soap/deploy.xml.tera`                 |
//! | checkDeployStatus       | `soap/check_deploy_status.xml.tera`    |
//!
//! Template names end in `.tera`, so Tera's autoescaping never applies;
//! envelope fields that carry operator input use `escape_xml` explicitly.

use serde::Serialize;
use tera::Tera;

use orgdelta_core::TestConfig;

use crate::context::ManifestContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const MANIFEST_TEMPLATE: &str = "package.xml.tera";

const TPLS: &[(&str, &str)] = &[
    (MANIFEST_TEMPLATE, include_str!("templates/package.xml.tera")),
    ("soap/_header.tera", include_str!("templates/soap/_header.tera")),
    (
        "soap/retrieve.xml.tera",
        include_str!("templates/soap/retrieve.xml.tera"),
    ),
    (
        "soap/check_retrieve_status.xml.tera",
        include_str!("templates/soap/check_retrieve_status.xml.tera"),
    ),
    ("soap/deploy.xml.tera", include_str!("templates/soap/deploy.xml.tera")),
    (
        "soap/check_deploy_status.xml.tera",
        include_str!("templates/soap/check_deploy_status.xml.tera"),
    ),
];

fn build_tera() -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TPLS.iter().copied())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A metadata API request body.
#[derive(Debug, Clone)]
pub enum Envelope<'a> {
    /// Start an asynchronous retrieve for the `<types>` fragment.
    Retrieve {
        session_id: &'a str,
        api_version: &'a str,
        unpackaged_xml: &'a str,
    },
    /// Poll a retrieve, asking for the zip once done.
    CheckRetrieveStatus { session_id: &'a str, job_id: &'a str },
    /// Submit a base64 zip for deployment.
    Deploy {
        session_id: &'a str,
        zip_base64: &'a str,
        options: &'a TestConfig,
    },
    /// Poll a deploy.
    CheckDeployStatus { session_id: &'a str, job_id: &'a str },
}

#[derive(Serialize)]
struct DeployCtx<'a> {
    session_id: &'a str,
    zip_base64: &'a str,
    check_only: bool,
    test_level: String,
    test_classes: &'a [String],
}

impl Envelope<'_> {
    pub fn template_name(&self) -> &'static str {
        match self {
            Envelope::Retrieve { .. } => "soap/retrieve.xml.tera",
            Envelope::CheckRetrieveStatus { .. } => "soap/check_retrieve_status.xml.tera",
            Envelope::Deploy { .. } => "soap/deploy.xml.tera",
            Envelope::CheckDeployStatus { .. } => "soap/check_deploy_status.xml.tera",
        }
    }

    /// SOAP operation name, for logging.
    pub fn operation(&self) -> &'static str {
        match self {
            Envelope::Retrieve { .. } => "retrieve",
            Envelope::CheckRetrieveStatus { .. } => "checkRetrieveStatus",
            Envelope::Deploy { .. } => "deploy",
            Envelope::CheckDeployStatus { .. } => "checkDeployStatus",
        }
    }

    fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        let mut ctx = tera::Context::new();
        match self {
            Envelope::Retrieve {
                session_id,
                api_version,
                unpackaged_xml,
            } => {
                ctx.insert("session_id", session_id);
                ctx.insert("api_version", api_version);
                ctx.insert("unpackaged_xml", unpackaged_xml);
            }
            Envelope::CheckRetrieveStatus { session_id, job_id }
            | Envelope::CheckDeployStatus { session_id, job_id } => {
                ctx.insert("session_id", session_id);
                ctx.insert("job_id", job_id);
            }
            Envelope::Deploy {
                session_id,
                zip_base64,
                options,
            } => {
                ctx = tera::Context::from_serialize(DeployCtx {
                    session_id,
                    zip_base64,
                    check_only: options.check_only,
                    test_level: options.test_level.to_string(),
                    test_classes: &options.test_classes,
                })?;
            }
        }
        Ok(ctx)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer for manifests and envelopes.
///
/// Uses embedded templates only. Create once with [`Renderer::new`] and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Construct a new [`Renderer`] with embedded templates.
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { tera: build_tera()? })
    }

    /// Render `package.xml`.
    pub fn render_manifest(&self, ctx: &ManifestContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(MANIFEST_TEMPLATE, &tera_ctx)?)
    }

    /// Render a SOAP request body.
    pub fn render_envelope(&self, envelope: &Envelope<'_>) -> Result<String, RenderError> {
        let tera_ctx = envelope.to_tera_context()?;
        Ok(self.tera.render(envelope.template_name(), &tera_ctx)?)
    }
}
