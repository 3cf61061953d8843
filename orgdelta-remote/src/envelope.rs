//! Reading SOAP response envelopes.
//!
//! Elements are matched by local name, so `met:status` and `status` are the
//! same element. A path like `["result", "id"]` matches an `id` element whose
//! parent is `result`, wherever that pair occurs; the first match in document
//! order wins.

use quick_xml::events::Event;
use quick_xml::Reader;

use orgdelta_core::{DeployStatus, JobId};

use crate::error::{envelope_err, RemoteError};

/// Text content of the first element matching `path`, with entities
/// resolved and surrounding whitespace trimmed.
///
/// `Ok(None)` means the document parsed but no element matched.
pub fn element_text(xml: &str, path: &[&str]) -> Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // (collected text, nesting depth below the matched element)
    let mut capture: Option<(String, usize)> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                if let Some((_, depth)) = capture.as_mut() {
                    *depth += 1;
                    continue;
                }
                stack.push(e.local_name().as_ref().to_vec());
                if ends_with(&stack, path) {
                    capture = Some((String::new(), 0));
                }
            }
            Event::Empty(e) => {
                if capture.is_none() {
                    stack.push(e.local_name().as_ref().to_vec());
                    let matched = ends_with(&stack, path);
                    stack.pop();
                    if matched {
                        return Ok(Some(String::new()));
                    }
                }
            }
            Event::Text(t) => {
                if let Some((buf, _)) = capture.as_mut() {
                    buf.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::CData(c) => {
                if let Some((buf, _)) = capture.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => match capture.as_mut() {
                Some((buf, 0)) => return Ok(Some(buf.trim().to_string())),
                Some((_, depth)) => *depth -= 1,
                None => {
                    stack.pop();
                }
            },
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn ends_with(stack: &[Vec<u8>], path: &[&str]) -> bool {
    stack.len() >= path.len()
        && stack[stack.len() - path.len()..]
            .iter()
            .zip(path)
            .all(|(have, want)| have.as_slice() == want.as_bytes())
}

fn find(xml: &str, path: &[&str], operation: &'static str) -> Result<Option<String>, RemoteError> {
    element_text(xml, path).map_err(|detail| envelope_err(operation, detail))
}

/// `faultstring` of a SOAP fault, if the body is one.
pub fn fault_string(xml: &str) -> Option<String> {
    element_text(xml, &["faultstring"])
        .ok()
        .flatten()
        .filter(|s| !s.is_empty())
}

/// Async process id from a `retrieve` or `deploy` response (`result/id`).
pub fn parse_job_id(xml: &str, operation: &'static str) -> Result<JobId, RemoteError> {
    match find(xml, &["result", "id"], operation)? {
        Some(id) if !id.is_empty() => Ok(JobId(id)),
        _ => Err(envelope_err(operation, "no result/id element")),
    }
}

/// One `checkDeployStatus` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// `None` when the status element is absent or holds unknown text.
    pub status: Option<DeployStatus>,
    /// First `problem` text in the response, if any.
    pub problem: Option<String>,
}

pub fn parse_deploy_status(xml: &str) -> Result<StatusReport, RemoteError> {
    const OP: &str = "checkDeployStatus";
    let status = find(xml, &["result", "status"], OP)?
        .as_deref()
        .and_then(DeployStatus::from_api);
    let problem = find(xml, &["problem"], OP)?.filter(|p| !p.is_empty());
    Ok(StatusReport { status, problem })
}

/// Interpretation of a `checkRetrieveStatus` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveOutcome {
    /// Still `InProgress` or `Pending`.
    Pending,
    /// Base64 zip payload.
    Ready(String),
    Failed(String),
}

pub fn parse_retrieve_status(xml: &str) -> Result<RetrieveOutcome, RemoteError> {
    const OP: &str = "checkRetrieveStatus";
    let status = find(xml, &["result", "status"], OP)?;
    if matches!(status.as_deref(), Some("InProgress") | Some("Pending")) {
        return Ok(RetrieveOutcome::Pending);
    }
    let failed_status = status.as_deref() == Some("Failed");
    if failed_status || find(xml, &["success"], OP)?.as_deref() == Some("false") {
        let message = find(xml, &["errorMessage"], OP)?.unwrap_or_else(|| {
            if failed_status {
                "retrieve reported status=Failed".to_string()
            } else {
                "retrieve reported success=false".to_string()
            }
        });
        return Ok(RetrieveOutcome::Failed(message));
    }
    match find(xml, &["zipFile"], OP)? {
        Some(zip) if !zip.is_empty() => Ok(RetrieveOutcome::Ready(zip)),
        _ => Err(envelope_err(OP, "no zipFile element")),
    }
}
