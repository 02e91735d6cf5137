//! Test file content generation.
//!
//! Two paths exist:
//! - [`generate_text_content`] / [`generate_content_by_type`] build a small,
//!   well-formed document of roughly the requested size in one go.
//! - [`BulkGenerator`] produces arbitrarily large payloads (up to
//!   [`MAX_TOTAL_SIZE`]) as a sequence of fixed-size chunks pushed into a
//!   [`Sink`], polling a cancel flag between chunks and yielding to the
//!   runtime every few chunks so other tasks keep running.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::{Sink, SinkExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::BuddyError;

pub const CHUNK_SIZE: usize = 10 * 1024 * 1024;
pub const PROGRESS_INTERVAL: u64 = 50 * 1024 * 1024;
pub const MAX_TOTAL_SIZE: u64 = 2 * 1024 * 1024 * 1024;
/// Chunks written between cooperative yields.
pub const YIELD_EVERY: u64 = 5;

pub const GENERATOR_NAME: &str = "TestData Buddy";
pub const TEXT_HEADER: &str = "TestData Buddy generated file";

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.\n";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ContentKind {
    #[default]
    Txt,
    Json,
    Csv,
    Xml,
}

impl ContentKind {
    pub fn extension(self) -> &'static str {
        match self {
            ContentKind::Txt => "txt",
            ContentKind::Json => "json",
            ContentKind::Csv => "csv",
            ContentKind::Xml => "xml",
        }
    }

    pub fn mime_type(self) -> &'static str {
        mime_type_for_extension(self.extension())
    }

    /// Unit tiled to fill bulk chunks. ASCII only, so any byte cut is valid UTF-8.
    fn pattern(self) -> &'static str {
        match self {
            ContentKind::Txt => LOREM,
            ContentKind::Json => {
                "{\"id\":\"test-record\",\"name\":\"sample\",\"active\":true,\"score\":42}\n"
            }
            ContentKind::Csv => "test-record,sample,user@example.com,42,true\n",
            ContentKind::Xml => {
                "<record><id>test-record</id><name>sample</name><score>42</score></record>\n"
            }
        }
    }
}

impl FromStr for ContentKind {
    type Err = BuddyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ContentKind::Txt),
            "json" => Ok(ContentKind::Json),
            "csv" => Ok(ContentKind::Csv),
            "xml" => Ok(ContentKind::Xml),
            other => Err(BuddyError::InvalidInput(format!(
                "unsupported content type: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for ContentKind {
    type Error = BuddyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

pub fn mime_type_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "txt" | "log" => "text/plain",
        "json" => "application/json",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "html" | "htm" => "text/html",
        "md" => "text/markdown",
        "tsv" => "text/tab-separated-values",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Cut `s` to at most `max` bytes without splitting a char.
fn truncate_on_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// Plain text document of `size` bytes: synthetic header, then lorem lines.
pub fn generate_text_content(size: usize) -> String {
    let mut out = format!(
        "{TEXT_HEADER}\nGenerated at: {}\nTarget size: {size} bytes\n{}\n",
        Utc::now().to_rfc3339(),
        "=".repeat(40)
    );
    if out.len() >= size {
        truncate_on_char_boundary(&mut out, size);
        return out;
    }
    out.reserve(size - out.len());
    while out.len() + LOREM.len() <= size {
        out.push_str(LOREM);
    }
    let remaining = size - out.len();
    out.push_str(&LOREM[..remaining]);
    out
}

fn sample_record(index: usize) -> Value {
    json!({
        "id": index + 1,
        "name": format!("test-user-{}", index + 1),
        "email": format!("user{}@example.com", index + 1),
        "score": (index * 37) % 1000,
        "active": index % 2 == 0,
    })
}

/// Well-formed document of the given kind, grown record by record until
/// the next record would overshoot `size`.
pub fn generate_content_by_type(size: usize, kind: ContentKind) -> Result<String, BuddyError> {
    match kind {
        ContentKind::Txt => Ok(generate_text_content(size)),
        ContentKind::Json => json_document(size),
        ContentKind::Csv => Ok(csv_document(size)),
        ContentKind::Xml => Ok(xml_document(size)),
    }
}

fn json_document(size: usize) -> Result<String, BuddyError> {
    let metadata = json!({
        "generator": GENERATOR_NAME,
        "generatedAt": Utc::now().to_rfc3339(),
        "targetSize": size,
    });
    // `{"metadata":…,"records":[…]}`
    let base = serde_json::to_string(&json!({ "metadata": metadata, "records": [] }))?.len();
    let mut used = base;
    let mut records = Vec::new();
    loop {
        let record = sample_record(records.len());
        let len = serde_json::to_string(&record)?.len() + usize::from(!records.is_empty());
        if used + len > size {
            break;
        }
        used += len;
        records.push(record);
    }
    Ok(serde_json::to_string(
        &json!({ "metadata": metadata, "records": records }),
    )?)
}

fn csv_document(size: usize) -> String {
    let mut out = String::from("id,name,email,score,active\n");
    let mut index = 0;
    loop {
        let row = format!(
            "{},test-user-{},user{}@example.com,{},{}\n",
            index + 1,
            index + 1,
            index + 1,
            (index * 37) % 1000,
            index % 2 == 0
        );
        if out.len() + row.len() > size {
            break;
        }
        out.push_str(&row);
        index += 1;
    }
    out
}

fn xml_document(size: usize) -> String {
    let mut out = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testData generator=\"{GENERATOR_NAME}\" targetSize=\"{size}\">\n"
    );
    const CLOSE: &str = "</testData>\n";
    let mut index = 0;
    loop {
        let row = format!(
            "  <record id=\"{}\"><name>test-user-{}</name><email>user{}@example.com</email><score>{}</score></record>\n",
            index + 1,
            index + 1,
            index + 1,
            (index * 37) % 1000
        );
        if out.len() + row.len() + CLOSE.len() > size {
            break;
        }
        out.push_str(&row);
        index += 1;
    }
    out.push_str(CLOSE);
    out
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub bytes_written: u64,
    pub total: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub kind: ContentKind,
    pub bytes_written: u64,
    pub chunks: u64,
}

/// Chunked generator for large payloads.
#[derive(Debug, Clone)]
pub struct BulkGenerator {
    chunk_size: usize,
    progress_interval: u64,
    yield_every: u64,
    limit: u64,
}

impl Default for BulkGenerator {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            progress_interval: PROGRESS_INTERVAL,
            yield_every: YIELD_EVERY,
            limit: MAX_TOTAL_SIZE,
        }
    }
}

impl BulkGenerator {
    /// Lower the size ceiling. Values above [`MAX_TOTAL_SIZE`] are clamped.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit.min(MAX_TOTAL_SIZE);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize, progress_interval: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.progress_interval = progress_interval.max(1);
        self
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Reject a request before any work is done.
    pub fn check(&self, target: u64) -> Result<(), BuddyError> {
        if target > self.limit {
            return Err(BuddyError::SizeLimitExceeded {
                requested: target,
                limit: self.limit,
            });
        }
        Ok(())
    }

    fn build_template(&self, kind: ContentKind, target: u64) -> Vec<u8> {
        let len = (self.chunk_size as u64).min(target) as usize;
        let pattern = kind.pattern().as_bytes();
        pattern.iter().copied().cycle().take(len).collect()
    }

    /// Write exactly `target` bytes of `kind` content into `sink`.
    ///
    /// `on_progress` fires each time another progress interval has been
    /// written and once at completion. `cancel` is checked before every chunk.
    pub async fn generate<S, F>(
        &self,
        target: u64,
        kind: ContentKind,
        sink: &mut S,
        mut on_progress: F,
        cancel: &AtomicBool,
    ) -> Result<GenerationSummary, BuddyError>
    where
        S: Sink<Vec<u8>> + Unpin,
        S::Error: Display,
        F: FnMut(Progress),
    {
        self.check(target)?;
        if cancel.load(Ordering::Relaxed) {
            return Err(BuddyError::Cancelled);
        }

        let template = self.build_template(kind, target);
        let mut written: u64 = 0;
        let mut chunks: u64 = 0;
        let mut next_report = self.progress_interval;

        while written < target {
            if cancel.load(Ordering::Relaxed) {
                debug!(written, target, "bulk generation cancelled");
                return Err(BuddyError::Cancelled);
            }

            let len = (target - written).min(template.len() as u64) as usize;
            sink.send(template[..len].to_vec())
                .await
                .map_err(|e| sink_error(e, cancel))?;
            written += len as u64;
            chunks += 1;

            if written >= next_report && written < target {
                on_progress(progress(written, target));
                next_report = (written / self.progress_interval + 1) * self.progress_interval;
            }
            if chunks % self.yield_every == 0 {
                tokio::task::yield_now().await;
            }
        }

        sink.flush().await.map_err(|e| sink_error(e, cancel))?;
        on_progress(progress(written, target));

        Ok(GenerationSummary {
            kind,
            bytes_written: written,
            chunks,
        })
    }
}

/// Sink failures after `cancel` was raised mean the consumer left on purpose.
fn sink_error(cause: impl Display, cancel: &AtomicBool) -> BuddyError {
    if cancel.load(Ordering::Relaxed) {
        BuddyError::Cancelled
    } else {
        BuddyError::generation(cause)
    }
}

fn progress(written: u64, total: u64) -> Progress {
    let percent = if total == 0 {
        100.0
    } else {
        (written as f64 / total as f64 * 1000.0).round() / 10.0
    };
    Progress {
        bytes_written: written,
        total,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::StreamExt;

    fn small() -> BulkGenerator {
        BulkGenerator::default().with_chunk_size(1000, 2500)
    }

    #[tokio::test]
    async fn bulk_output_has_exact_length_for_every_kind() {
        for kind in [
            ContentKind::Txt,
            ContentKind::Json,
            ContentKind::Csv,
            ContentKind::Xml,
        ] {
            for target in [0u64, 1, 999, 1000, 1001, 7_777] {
                let mut sink: Vec<Vec<u8>> = Vec::new();
                let summary = small()
                    .generate(target, kind, &mut sink, |_| {}, &AtomicBool::new(false))
                    .await
                    .unwrap();
                let total: usize = sink.iter().map(Vec::len).sum();
                assert_eq!(total as u64, target, "{kind} {target}");
                assert_eq!(summary.bytes_written, target);
                assert_eq!(summary.chunks, target.div_ceil(1000));
                let joined = sink.concat();
                assert!(std::str::from_utf8(&joined).is_ok());
            }
        }
    }

    #[tokio::test]
    async fn progress_reported_per_interval_and_at_end() {
        let mut sink: Vec<Vec<u8>> = Vec::new();
        let mut reports = Vec::new();
        small()
            .generate(
                7_000,
                ContentKind::Csv,
                &mut sink,
                |p| reports.push(p.bytes_written),
                &AtomicBool::new(false),
            )
            .await
            .unwrap();
        assert_eq!(reports, vec![3000, 5000, 7000]);
    }

    #[tokio::test]
    async fn oversized_request_rejected_before_work() {
        let mut sink: Vec<Vec<u8>> = Vec::new();
        let err = BulkGenerator::default()
            .generate(
                MAX_TOTAL_SIZE + 1,
                ContentKind::Txt,
                &mut sink,
                |_| {},
                &AtomicBool::new(false),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BuddyError::SizeLimitExceeded { .. }));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn custom_limit_is_enforced() {
        let generator = small().with_limit(5000);
        assert!(generator.check(5000).is_ok());
        assert!(generator.check(5001).is_err());
        assert_eq!(
            BulkGenerator::default().with_limit(u64::MAX).limit(),
            MAX_TOTAL_SIZE
        );
    }

    #[tokio::test]
    async fn already_cancelled_produces_nothing() {
        let mut sink: Vec<Vec<u8>> = Vec::new();
        let err = small()
            .generate(
                10_000,
                ContentKind::Txt,
                &mut sink,
                |_| {},
                &AtomicBool::new(true),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BuddyError::Cancelled));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn closed_sink_surfaces_generation_error() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(1);
        drop(rx);
        let mut tx = tx;
        let err = small()
            .generate(
                5000,
                ContentKind::Txt,
                &mut tx,
                |_| {},
                &AtomicBool::new(false),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BuddyError::Generation(_)));
    }

    #[tokio::test]
    async fn consumer_leaving_mid_stream_reports_cancelled() {
        use std::sync::Arc;

        let (mut tx, mut rx) = mpsc::channel::<Vec<u8>>(0);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let producer = tokio::spawn(async move {
            small()
                .generate(1_000_000, ContentKind::Txt, &mut tx, |_| {}, &flag)
                .await
        });

        assert_eq!(rx.next().await.map(|c| c.len()), Some(1000));
        cancel.store(true, Ordering::Relaxed);
        drop(rx);

        let err = producer.await.unwrap().unwrap_err();
        assert!(matches!(err, BuddyError::Cancelled));
    }

    #[tokio::test]
    async fn channel_sink_streams_chunks() {
        let (mut tx, rx) = mpsc::channel::<Vec<u8>>(4);
        let reader = tokio::spawn(async move { rx.map(|c| c.len()).collect::<Vec<_>>().await });
        small()
            .generate(
                2_500,
                ContentKind::Json,
                &mut tx,
                |_| {},
                &AtomicBool::new(false),
            )
            .await
            .unwrap();
        drop(tx);
        assert_eq!(reader.await.unwrap(), vec![1000, 1000, 500]);
    }

    #[test]
    fn text_content_close_to_target() {
        let text = generate_text_content(1000);
        assert!((900..=1100).contains(&text.len()));
        assert!(text.contains(TEXT_HEADER));
        assert_eq!(generate_text_content(10).len(), 10);
    }

    #[test]
    fn json_content_is_valid() {
        let text = generate_content_by_type(1000, ContentKind::Json).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["metadata"]["generator"], GENERATOR_NAME);
        assert!(text.len() <= 1000);
        assert!(!value["records"].as_array().unwrap().is_empty());
    }

    #[test]
    fn csv_and_xml_shapes() {
        let csv = generate_content_by_type(500, ContentKind::Csv).unwrap();
        assert!(csv.starts_with("id,name,email,score,active\n"));
        assert!(csv.len() <= 500);
        let xml = generate_content_by_type(800, ContentKind::Xml).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.trim_end().ends_with("</testData>"));
        assert!(xml.len() <= 800);
    }

    #[test]
    fn mime_types_from_extension() {
        assert_eq!(mime_type_for_extension("CSV"), "text/csv");
        assert_eq!(mime_type_for_extension(".yml"), "application/yaml");
        assert_eq!(mime_type_for_extension("bin"), "application/octet-stream");
        assert_eq!(ContentKind::Xml.mime_type(), "application/xml");
        assert_eq!("TEXT".parse::<ContentKind>().unwrap(), ContentKind::Txt);
        assert!("exe".parse::<ContentKind>().is_err());
        let kind: ContentKind = serde_json::from_str("\".CSV\"").unwrap();
        assert_eq!(kind, ContentKind::Csv);
        assert!(serde_json::from_str::<ContentKind>("\"exe\"").is_err());
    }
}
