//! Chart series and per-record summaries derived from performance records.

use qflow_types::PerformanceRecord;
use serde::Serialize;

/// Parallel arrays for the runtime and shots charts, one entry per record.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    /// Seconds, verbatim.
    pub runtime: Vec<f64>,
    /// Absent shot counts are charted as zero.
    pub shots: Vec<u64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Display summary of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub heading: String,
    pub lines: Vec<SummaryLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
}

impl SummaryLine {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

impl RecordSummary {
    pub fn has_line(&self, label: &str) -> bool {
        self.lines.iter().any(|line| line.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MetricsView {
    pub series: ChartSeries,
    pub summaries: Vec<RecordSummary>,
}

impl MetricsView {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

pub fn chart_series(records: &[PerformanceRecord]) -> ChartSeries {
    ChartSeries {
        labels: records.iter().map(|record| format!("Task {}", record.task_id)).collect(),
        runtime: records.iter().map(|record| record.runtime).collect(),
        shots: records.iter().map(|record| record.shots.unwrap_or(0)).collect(),
    }
}

pub fn summarize(record: &PerformanceRecord) -> RecordSummary {
    let mut lines = vec![SummaryLine::new("Runtime", format!("{:.2}s", record.runtime))];
    if let Some(depth) = record.circuit_depth {
        lines.push(SummaryLine::new("Circuit Depth", depth.to_string()));
    }
    if let Some(shots) = record.shots {
        lines.push(SummaryLine::new("Shots", shots.to_string()));
    }
    let recorded = record
        .recorded_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| record.timestamp.clone());
    lines.push(SummaryLine::new("Recorded", recorded));

    RecordSummary {
        heading: format!("Workflow {} · Task {}", record.workflow_id, record.task_id),
        lines,
    }
}

/// Series and summaries for `records`, preserving input order.
pub fn aggregate(records: &[PerformanceRecord]) -> MetricsView {
    MetricsView {
        series: chart_series(records),
        summaries: records.iter().map(summarize).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(task_id: i64, runtime: f64, circuit_depth: Option<u64>, shots: Option<u64>) -> PerformanceRecord {
        PerformanceRecord {
            workflow_id: 4,
            task_id,
            runtime,
            circuit_depth,
            shots,
            timestamp: "2024-03-09T08:07:06.5".into(),
        }
    }

    #[test]
    fn labels_follow_input_order() {
        let view = aggregate(&[record(2, 0.5, None, None), record(1, 1.0, None, None)]);
        assert_eq!(view.series.labels, vec!["Task 2", "Task 1"]);
        assert_eq!(view.series.runtime, vec![0.5, 1.0]);
    }

    #[test]
    fn missing_shots_chart_as_zero_but_are_not_summarized() {
        let view = aggregate(&[record(1, 0.1, None, None), record(2, 0.2, Some(5), Some(100))]);
        assert_eq!(view.series.shots, vec![0, 100]);
        assert!(!view.summaries[0].has_line("Shots"));
        assert!(view.summaries[1].has_line("Shots"));
    }

    #[test]
    fn circuit_depth_line_only_when_present() {
        let without = summarize(&record(1, 0.1, None, Some(10)));
        let with = summarize(&record(1, 0.1, Some(5), Some(10)));
        assert!(!without.has_line("Circuit Depth"));
        assert!(with.lines.contains(&SummaryLine::new("Circuit Depth", "5".into())));
    }

    #[test]
    fn runtime_uses_two_decimals_and_timestamp_is_normalised() {
        let summary = summarize(&record(3, 1.0, None, None));
        assert_eq!(summary.heading, "Workflow 4 · Task 3");
        assert_eq!(summary.lines[0], SummaryLine::new("Runtime", "1.00s".into()));
        assert_eq!(
            summary.lines.last().unwrap(),
            &SummaryLine::new("Recorded", "2024-03-09 08:07:06".into())
        );
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        let mut raw = record(1, 0.333, None, None);
        raw.timestamp = "yesterday".into();
        let summary = summarize(&raw);
        assert_eq!(summary.lines[0].value, "0.33s");
        assert_eq!(summary.lines[1], SummaryLine::new("Recorded", "yesterday".into()));
    }
}
