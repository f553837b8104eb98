//! Grounding-exercise suggestions for `GET /api/v1/intervention`.
//!
//! Presentation sugar over `recommended_action`, adapted from the teacher's
//! `interventions.rs::get_grounding_exercise`: deterministic on `risk_score`
//! rather than time-seeded, since this crate avoids non-deterministic output
//! anywhere else on its response surface.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct InterventionResponse {
    pub risk_score: u8,
    pub title: String,
    pub exercise: String,
    pub recommended_seconds: u32,
}

fn pick<'a, T>(items: &'a [T], seed: u8) -> &'a T {
    let idx = (seed as usize) % items.len();
    &items[idx]
}

pub fn get_grounding_exercise(risk_score: u8) -> InterventionResponse {
    let recommended_seconds = if risk_score >= 90 {
        20 * 60
    } else if risk_score >= 80 {
        15 * 60
    } else if risk_score >= 70 {
        10 * 60
    } else {
        5 * 60
    };

    let high_intensity: [(&str, &str); 3] = [
        (
            "4-7-8 Breathing",
            "Inhale through the nose for 4. Hold for 7. Exhale slowly for 8. Repeat 4 cycles. If dizziness occurs, shorten the hold.",
        ),
        (
            "Box Breathing",
            "Inhale 4, hold 4, exhale 4, hold 4. Repeat for 3-5 minutes. Keep shoulders down and jaw unclenched.",
        ),
        (
            "5-4-3-2-1 Grounding",
            "Name 5 things you see, 4 you feel, 3 you hear, 2 you smell, 1 you taste. Then take one slow exhale.",
        ),
    ];

    let low_energy: [(&str, &str); 3] = [
        (
            "Micro-Rest and Water",
            "Drink a glass of water. Sit or lie down for 5 minutes with eyes closed. Let your exhale be longer than your inhale.",
        ),
        (
            "Gentle Movement Reset",
            "Stand up. Roll shoulders 10x. Shake out arms for 30 seconds. Walk for 2 minutes. Reassess before messaging.",
        ),
        (
            "Nourishment Check",
            "If you haven't eaten in 4+ hours, have a small snack. Set a 10-minute timer, then revisit.",
        ),
    ];

    let (title, exercise) = if risk_score >= 80 {
        *pick(&high_intensity, risk_score)
    } else {
        *pick(&low_energy, risk_score)
    };

    InterventionResponse {
        risk_score,
        title: title.to_string(),
        exercise: exercise.to_string(),
        recommended_seconds,
    }
}
