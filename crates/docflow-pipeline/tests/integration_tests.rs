//! End-to-end pipeline tests over real temp folders with mock models

use docflow_extract::TextExtractor;
use docflow_llm::MockModel;
use docflow_match::Matcher;
use docflow_pipeline::{FileProcessor, PipelineConfig, PipelineWorker};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TABLE: &str = "date;description;amount;total\n2024-01-02;ACME invoice;100.00;1100.00\n2024-01-05;Office rent;850.00;1950.00\n";

struct Harness {
    _root: TempDir,
    config: PipelineConfig,
    vision: MockModel,
    text: MockModel,
}

impl Harness {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = PipelineConfig::under_root(root.path());
        config.ensure_folders().unwrap();

        Self {
            _root: root,
            config,
            vision: MockModel::new("transcribed image text"),
            text: MockModel::new(r#"{"confidence": 0.0, "row_number": null}"#),
        }
    }

    fn processor(&self) -> FileProcessor<MockModel, MockModel> {
        FileProcessor::new(
            TextExtractor::new(self.vision.clone(), "transcribe"),
            Matcher::new(self.text.clone(), ""),
            self.config.clone(),
        )
    }

    fn write_table(&self) {
        fs::write(&self.config.match_file, TABLE).unwrap();
    }

    fn drop_incoming(&self, name: &str, contents: &[u8]) {
        fs::write(self.config.incoming_dir.join(name), contents).unwrap();
    }

    fn place_artifact(&self, name: &str, contents: &str) {
        fs::write(self.config.extracted_dir.join(name), contents).unwrap();
    }

    fn names_in(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// A complete one-page PDF with an embedded text layer and a correct xref
/// table, so the text-layer extractor has something real to chew on.
fn write_minimal_pdf(path: &Path, text: &str) {
    let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, object));
    }

    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    pdf.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));

    fs::write(path, pdf).unwrap();
}

#[tokio::test]
async fn stage1_on_empty_incoming_is_a_noop() {
    let h = Harness::new();
    let processor = h.processor();

    let report = processor.run_extraction_pass().await.unwrap();

    assert_eq!(report.extracted, 0);
    assert_eq!(report.failed, 0);
    assert!(h.names_in(&h.config.extracted_dir).is_empty());
    assert!(h.names_in(&h.config.processed_dir).is_empty());
    assert!(h.names_in(&h.config.errors_dir).is_empty());
    assert_eq!(h.vision.call_count(), 0);
}

#[tokio::test]
async fn mixed_batch_flows_end_to_end() {
    let mut h = Harness::new();
    h.write_table();

    write_minimal_pdf(&h.config.incoming_dir.join("a.pdf"), "INVOICEALPHA 100.00");
    h.drop_incoming("b.jpg", b"jpeg bytes");
    h.vision = MockModel::new("receipt BRAVO body");
    h.text.add_response(
        "INVOICEALPHA",
        r#"{"confidence": 0.92, "row_number": 1, "rationale": "date and amount line up"}"#,
    );
    h.text
        .add_response("BRAVO", r#"{"confidence": 0.3, "row_number": 2}"#);

    let processor = h.processor();
    let extraction = processor.run_extraction_pass().await.unwrap();
    assert_eq!(extraction.extracted, 2);
    assert_eq!(extraction.failed, 0);

    // Exclusivity: both sources archived exactly once, incoming drained
    assert!(h.names_in(&h.config.incoming_dir).is_empty());
    assert_eq!(h.names_in(&h.config.processed_dir), vec!["a.pdf", "b.jpg"]);
    assert!(h.names_in(&h.config.errors_dir).is_empty());
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["a.txt", "b.txt"]);
    assert!(fs::read_to_string(h.config.extracted_dir.join("a.txt"))
        .unwrap()
        .contains("INVOICEALPHA"));

    let matching = processor.run_matching_pass().await.unwrap();
    assert_eq!(matching.matched, 1);
    assert_eq!(matching.examined, 2);

    // a promoted with both companions, b stays behind
    assert_eq!(
        h.names_in(&h.config.matches_dir),
        vec!["a.txt", "a_match.json", "a_matched_row.txt"]
    );
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["b.txt"]);

    let verdict: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(h.config.matches_dir.join("a_match.json")).unwrap())
            .unwrap();
    assert_eq!(verdict["confidence"], 0.92);
    assert_eq!(verdict["row_number"], 1);
    assert_eq!(verdict["rationale"], "date and amount line up");
    assert!(verdict["matched_at"].as_u64().unwrap() > 0);

    assert_eq!(
        fs::read_to_string(h.config.matches_dir.join("a_matched_row.txt")).unwrap(),
        "2024-01-02;ACME invoice;100.00;1100.00"
    );
}

#[tokio::test]
async fn unsupported_extension_goes_to_errors() {
    let h = Harness::new();
    h.drop_incoming("c.docx", b"word soup");

    let report = h.processor().run_extraction_pass().await.unwrap();

    assert_eq!(report.extracted, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(h.names_in(&h.config.errors_dir), vec!["c.docx"]);
    assert!(h.names_in(&h.config.extracted_dir).is_empty());
    assert!(h.names_in(&h.config.incoming_dir).is_empty());
    // No extraction was attempted for it
    assert_eq!(h.vision.call_count(), 0);
}

#[tokio::test]
async fn corrupt_document_goes_to_errors() {
    let h = Harness::new();
    h.drop_incoming("broken.pdf", b"this is not a pdf at all");

    let report = h.processor().run_extraction_pass().await.unwrap();

    assert_eq!(report.extracted, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(h.names_in(&h.config.errors_dir), vec!["broken.pdf"]);
    assert!(h.names_in(&h.config.extracted_dir).is_empty());
}

#[tokio::test]
async fn vision_failure_goes_to_errors_without_aborting_the_pass() {
    let mut h = Harness::new();
    h.vision = {
        let mut v = MockModel::default();
        v.add_error("transcribe");
        v
    };
    h.drop_incoming("x.jpg", b"bytes");
    h.drop_incoming("y.docx", b"bytes");

    let report = h.processor().run_extraction_pass().await.unwrap();

    // Both failures contained; the pass finished
    assert_eq!(report.failed, 2);
    assert_eq!(h.names_in(&h.config.errors_dir), vec!["x.jpg", "y.docx"]);
}

#[tokio::test]
async fn stale_artifact_is_overwritten() {
    let h = Harness::new();
    h.place_artifact("scan.txt", "old text from a crashed run");
    h.drop_incoming("scan.jpg", b"bytes");

    let report = h.processor().run_extraction_pass().await.unwrap();

    assert_eq!(report.extracted, 1);
    assert_eq!(
        fs::read_to_string(h.config.extracted_dir.join("scan.txt")).unwrap(),
        "transcribed image text"
    );
}

#[tokio::test]
async fn move_failure_leaves_source_for_retry() {
    let h = Harness::new();
    h.drop_incoming("scan.jpg", b"bytes");
    fs::remove_dir_all(&h.config.processed_dir).unwrap();

    let report = h.processor().run_extraction_pass().await.unwrap();

    // Not counted as extracted, source still in incoming for the next pass
    assert_eq!(report.extracted, 0);
    assert_eq!(h.names_in(&h.config.incoming_dir), vec!["scan.jpg"]);

    fs::create_dir_all(&h.config.processed_dir).unwrap();
    let retry = h.processor().run_extraction_pass().await.unwrap();
    assert_eq!(retry.extracted, 1);
    assert_eq!(h.names_in(&h.config.processed_dir), vec!["scan.jpg"]);
}

#[tokio::test]
async fn threshold_boundary_is_inclusive() {
    let mut h = Harness::new();
    h.write_table();
    h.place_artifact("at.txt", "doc EXACTLY-AT");
    h.place_artifact("below.txt", "doc JUST-BELOW");
    h.text
        .add_response("EXACTLY-AT", r#"{"confidence": 0.6, "row_number": 1}"#);
    h.text
        .add_response("JUST-BELOW", r#"{"confidence": 0.5999, "row_number": 1}"#);

    let report = h.processor().run_matching_pass().await.unwrap();

    assert_eq!(report.matched, 1);
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["below.txt"]);
    assert!(h
        .names_in(&h.config.matches_dir)
        .contains(&"at.txt".to_string()));
}

#[tokio::test]
async fn out_of_range_row_is_never_accepted() {
    let mut h = Harness::new();
    h.write_table();
    h.place_artifact("big.txt", "doc ROW-TOO-BIG");
    h.place_artifact("zero.txt", "doc ROW-ZERO");
    h.place_artifact("none.txt", "doc ROW-NULL");
    // Table has 2 rows; all three verdicts are confident but unusable
    h.text
        .add_response("ROW-TOO-BIG", r#"{"confidence": 1.0, "row_number": 3}"#);
    h.text
        .add_response("ROW-ZERO", r#"{"confidence": 1.0, "row_number": 0}"#);
    h.text
        .add_response("ROW-NULL", r#"{"confidence": 1.0, "row_number": null}"#);

    let report = h.processor().run_matching_pass().await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(
        h.names_in(&h.config.extracted_dir),
        vec!["big.txt", "none.txt", "zero.txt"]
    );
    assert!(h.names_in(&h.config.matches_dir).is_empty());
}

#[tokio::test]
async fn unparseable_verdict_is_retried_on_a_later_pass() {
    let mut h = Harness::new();
    h.write_table();
    h.place_artifact("doc.txt", "doc RETRY-ME");
    h.text.add_response("RETRY-ME", "I have no idea, sorry");

    let first = h.processor().run_matching_pass().await.unwrap();
    assert_eq!(first.matched, 0);
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["doc.txt"]);

    // The oracle recovers; same artifact, new pass
    let healed = MockModel::new(r#"{"confidence": 0.9, "row_number": 2}"#);
    let processor = FileProcessor::new(
        TextExtractor::new(h.vision.clone(), "transcribe"),
        Matcher::new(healed, ""),
        h.config.clone(),
    );
    let second = processor.run_matching_pass().await.unwrap();
    assert_eq!(second.matched, 1);
    assert!(h.names_in(&h.config.extracted_dir).is_empty());
}

#[tokio::test]
async fn malformed_table_fails_the_pass_and_touches_nothing() {
    let mut h = Harness::new();
    fs::write(&h.config.match_file, "date;description;amount\na;b;c\n").unwrap();
    h.place_artifact("doc.txt", "text");
    h.text
        .add_response("text", r#"{"confidence": 1.0, "row_number": 1}"#);

    let result = h.processor().run_matching_pass().await;

    assert!(result.is_err());
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["doc.txt"]);
    assert_eq!(h.text.call_count(), 0);
}

#[tokio::test]
async fn empty_table_is_present_but_never_matches() {
    let mut h = Harness::new();
    fs::write(&h.config.match_file, "date;description;amount;total\n").unwrap();
    h.place_artifact("doc.txt", "text");
    h.text
        .add_response("text", r#"{"confidence": 1.0, "row_number": 1}"#);

    let report = h.processor().run_matching_pass().await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["doc.txt"]);
    // No oracle call was spent on an unmatchable table
    assert_eq!(h.text.call_count(), 0);
}

#[tokio::test]
async fn failed_promotion_never_leaves_an_artifact_without_its_verdict() {
    let mut h = Harness::new();
    h.write_table();
    h.place_artifact("doc.txt", "doc WILL-MATCH");
    h.text
        .add_response("WILL-MATCH", r#"{"confidence": 0.95, "row_number": 1}"#);
    // Companion writes will fail: the matches folder is gone
    fs::remove_dir_all(&h.config.matches_dir).unwrap();

    let report = h.processor().run_matching_pass().await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["doc.txt"]);
    assert!(!h.config.matches_dir.exists());
}

#[tokio::test]
async fn stage2_is_skipped_when_stage1_extracted_nothing() {
    let mut h = Harness::new();
    h.write_table();
    h.place_artifact("leftover.txt", "doc LEFTOVER");
    h.text
        .add_response("LEFTOVER", r#"{"confidence": 1.0, "row_number": 1}"#);

    let mut worker = PipelineWorker::new(h.processor());
    worker.run_cycles(1).await;

    // Incoming was empty: no extraction, therefore zero oracle calls even
    // though a matchable artifact sits in extracted
    assert_eq!(h.text.call_count(), 0);
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["leftover.txt"]);
    assert_eq!(worker.metrics().matching_skipped, 1);
    assert_eq!(worker.metrics().iterations, 1);
}

#[tokio::test]
async fn stage2_is_skipped_without_a_reference_table() {
    let h = Harness::new();
    h.drop_incoming("scan.jpg", b"bytes");

    let mut worker = PipelineWorker::new(h.processor());
    worker.run_cycles(1).await;

    assert_eq!(worker.metrics().files_extracted, 1);
    assert_eq!(worker.metrics().matching_skipped, 1);
    assert_eq!(h.text.call_count(), 0);
    assert_eq!(h.names_in(&h.config.extracted_dir), vec!["scan.txt"]);
}

#[tokio::test(start_paused = true)]
async fn worker_survives_a_failing_iteration() {
    let h = Harness::new();
    h.write_table();
    // Incoming folder vanishes mid-flight: the pass errors, the loop lives
    fs::remove_dir_all(&h.config.incoming_dir).unwrap();

    let mut worker = PipelineWorker::new(h.processor());
    worker.run_cycles(2).await;

    assert_eq!(worker.metrics().iterations, 2);
    assert_eq!(worker.metrics().files_extracted, 0);
}

#[tokio::test]
async fn worker_runs_both_stages_when_coupled() {
    let mut h = Harness::new();
    h.write_table();
    h.drop_incoming("b.jpg", b"bytes");
    h.vision = MockModel::new("receipt BRAVO body");
    h.text
        .add_response("BRAVO", r#"{"confidence": 0.95, "row_number": 2}"#);

    let mut worker = PipelineWorker::new(h.processor());
    worker.run_cycles(1).await;

    assert_eq!(worker.metrics().files_extracted, 1);
    assert_eq!(worker.metrics().artifacts_matched, 1);
    assert_eq!(
        h.names_in(&h.config.matches_dir),
        vec!["b.txt", "b_match.json", "b_matched_row.txt"]
    );
}
