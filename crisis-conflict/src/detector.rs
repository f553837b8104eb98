//! `ConflictDetector`: four independent, pure detectors over an ok
//! `SignalSet`. Any number may fire; emission order is the detector order
//! below, which callers (tests included) may rely on.

use crisis_common::{ConflictKind, ConflictRecord, ConflictSeverity, CrisisSignal, SignalSet, SourceName};

const PRIMARY_CRISIS_LABELS: &[&str] = &[
    "suicide ideation",
    "emotional distress",
    "self-harm",
    "hopelessness",
];
const PRIMARY_SAFE_LABELS: &[&str] = &["casual conversation", "positive sharing", "seeking support"];

pub fn detect(signals: &SignalSet) -> Vec<ConflictRecord> {
    let ok: Vec<&CrisisSignal> = signals.ok_signals().collect();
    let mut conflicts = Vec::new();

    if let Some(record) = score_disagreement(&ok) {
        conflicts.push(record);
    }
    if let Some(record) = irony_sentiment(&ok) {
        conflicts.push(record);
    }
    if let Some(record) = emotion_mismatch(&ok) {
        conflicts.push(record);
    }
    if let Some(record) = label_disagreement(&ok) {
        conflicts.push(record);
    }

    for record in &conflicts {
        tracing::debug!(kind = ?record.kind, severity = ?record.severity, "conflict detected");
    }

    conflicts
}

fn find<'a>(ok: &'a [&'a CrisisSignal], source: SourceName) -> Option<&'a CrisisSignal> {
    ok.iter().find(|s| s.source_name == source).copied()
}

fn score_disagreement(ok: &[&CrisisSignal]) -> Option<ConflictRecord> {
    if ok.len() < 2 {
        return None;
    }
    let max = ok.iter().max_by(|a, b| a.crisis_signal.total_cmp(&b.crisis_signal))?;
    let min = ok.iter().min_by(|a, b| a.crisis_signal.total_cmp(&b.crisis_signal))?;
    if max.crisis_signal - min.crisis_signal >= 0.4 {
        Some(ConflictRecord {
            kind: ConflictKind::ScoreDisagreement,
            severity: ConflictSeverity::High,
            participants: vec![min.source_name, max.source_name],
            description: format!(
                "{} scored {:.2} while {} scored {:.2}",
                max.source_name, max.crisis_signal, min.source_name, min.crisis_signal
            ),
        })
    } else {
        None
    }
}

fn irony_sentiment(ok: &[&CrisisSignal]) -> Option<ConflictRecord> {
    let irony = find(ok, SourceName::Irony)?;
    let sentiment = find(ok, SourceName::Sentiment)?;
    if irony.crisis_signal < 0.5 && sentiment.crisis_signal >= 0.7 {
        Some(ConflictRecord {
            kind: ConflictKind::IronySentiment,
            severity: ConflictSeverity::Medium,
            participants: vec![SourceName::Irony, SourceName::Sentiment],
            description: "irony source suggests sarcasm while sentiment reads strongly negative"
                .to_string(),
        })
    } else {
        None
    }
}

fn emotion_mismatch(ok: &[&CrisisSignal]) -> Option<ConflictRecord> {
    let primary = find(ok, SourceName::Primary)?;
    let sentiment = find(ok, SourceName::Sentiment)?;
    let emotion = find(ok, SourceName::Emotion)?;
    if primary.crisis_signal >= 0.6 && sentiment.crisis_signal >= 0.6 && emotion.crisis_signal <= 0.3 {
        Some(ConflictRecord {
            kind: ConflictKind::EmotionMismatch,
            severity: ConflictSeverity::Medium,
            participants: vec![SourceName::Primary, SourceName::Sentiment, SourceName::Emotion],
            description: "primary and sentiment agree on crisis but emotion reads positive-family"
                .to_string(),
        })
    } else {
        None
    }
}

fn label_family(label: &str) -> Option<bool> {
    let lower = label.to_ascii_lowercase();
    if PRIMARY_CRISIS_LABELS.contains(&lower.as_str()) {
        Some(true)
    } else if PRIMARY_SAFE_LABELS.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn label_disagreement(ok: &[&CrisisSignal]) -> Option<ConflictRecord> {
    let primary = find(ok, SourceName::Primary)?;
    let sentiment = find(ok, SourceName::Sentiment)?;
    let emotion = find(ok, SourceName::Emotion)?;

    let primary_family = label_family(&primary.raw_label)?;
    let derived_family = sentiment.crisis_signal >= 0.5 || emotion.crisis_signal >= 0.5;

    if primary_family != derived_family {
        Some(ConflictRecord {
            kind: ConflictKind::LabelDisagreement,
            severity: ConflictSeverity::Medium,
            participants: vec![SourceName::Primary, SourceName::Sentiment, SourceName::Emotion],
            description: "primary's label family disagrees with the sentiment+emotion-derived family"
                .to_string(),
        })
    } else {
        None
    }
}
