use super::catalog::{CareerProfile, SearchTags};
use super::domain::CareerSuggestion;
use super::repository::SessionSnapshot;
use super::scoring::{FitColor, ScoringResult};

/// Verdicts carry at most this many alternative-career suggestions.
const SUGGESTION_LIMIT: usize = 5;

/// Deterministic, rule-based recommendation list. Order is fixed: tier
/// message, location additions, role-keyword additions, bucket reminders.
pub(crate) fn next_steps(result: &ScoringResult, state: &str, target_role: &str) -> Vec<String> {
    let mut steps = Vec::new();

    match result.color {
        FitColor::Red => {
            steps.push(
                "Consider alternative career paths that better match your personality and lifestyle"
                    .to_string(),
            );
            steps.push(
                "Research careers with similar skills but different daily realities".to_string(),
            );
        }
        FitColor::Amber => {
            steps.push(
                "Address the identified mismatches before committing to this career".to_string(),
            );
            steps.push(
                "Shadow someone in this field for a day to experience the reality".to_string(),
            );
        }
        FitColor::Green => {
            steps.push("This career appears to be a good fit for you!".to_string());
            steps.push("Start networking with professionals in this field".to_string());
        }
    }

    if state == "CA" {
        steps.push("Research California-specific licensing requirements".to_string());
        steps.push("Check with the appropriate state board for current regulations".to_string());
    } else if state == "NY" {
        steps.push("Review New York state requirements and regulations".to_string());
        steps.push("Consider the cost of living in your target area".to_string());
    }

    let role_lower = target_role.to_lowercase();
    if role_lower.contains("nurse") {
        steps.push("Complete prerequisite courses if not already done".to_string());
        steps.push("Apply to accredited nursing programs".to_string());
        steps.push("Prepare for the NCLEX-RN exam".to_string());
    } else if role_lower.contains("real estate") {
        steps.push("Complete pre-licensing education requirements".to_string());
        steps.push("Find a sponsoring broker".to_string());
        steps.push("Pass the state real estate exam".to_string());
    }

    if result.bucket_scores.commitment < 50 {
        steps.push("Evaluate if you can commit to the required training timeline".to_string());
    }
    if result.bucket_scores.lifestyle < 50 {
        steps.push("Consider how this career will impact your personal life".to_string());
    }

    steps
}

/// One-paragraph verdict summary keyed on the color tier.
pub(crate) fn verdict_summary(result: &ScoringResult, target_role: &str) -> String {
    let fit_score = result.fit_score;
    match result.color {
        FitColor::Green => format!(
            "Great news! Your score of {fit_score}% suggests that {target_role} is a strong fit \
             for you. Your personality, daily preferences, and lifestyle align well with what \
             this career demands."
        ),
        FitColor::Amber => format!(
            "Your score of {fit_score}% indicates a mixed fit for {target_role}. While there are \
             some areas of alignment, there are also significant mismatches that you should \
             consider carefully before committing to this career path."
        ),
        FitColor::Red => format!(
            "Your score of {fit_score}% suggests that {target_role} may not be the best fit for \
             you. The mismatches identified could lead to frustration and dissatisfaction in \
             this career. Consider exploring alternative paths that better match your \
             personality and preferences."
        ),
    }
}

/// Tag sets for the alternative-career search: notes from affirmed
/// personality answers, plus reality keywords implied by the mismatches.
pub(crate) fn search_tags(snapshot: &SessionSnapshot, mismatches: &[String]) -> SearchTags {
    SearchTags {
        personality: snapshot.personality_notes(),
        realities: reality_keywords(mismatches),
    }
}

/// Map mismatch findings onto the reality-tag vocabulary of the career
/// directory. Each bucket contributes its keywords at most once.
pub(crate) fn reality_keywords(mismatches: &[String]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();

    for mismatch in mismatches {
        let lowered = mismatch.to_lowercase();
        if lowered.contains("personality") {
            extend_keywords(
                &mut keywords,
                ["people-oriented", "detail-oriented", "stress-tolerant"],
            );
        }
        if lowered.contains("daily") {
            extend_keywords(&mut keywords, ["administrative", "routine", "physical-demand"]);
        }
        if lowered.contains("commitment") {
            extend_keywords(&mut keywords, ["training", "education", "certification"]);
        }
        if lowered.contains("lifestyle") {
            extend_keywords(&mut keywords, ["flexible-schedule", "work-life-balance"]);
        }
    }

    keywords
}

fn extend_keywords<const N: usize>(keywords: &mut Vec<String>, additions: [&str; N]) {
    for addition in additions {
        if !keywords.iter().any(|existing| existing == addition) {
            keywords.push(addition.to_string());
        }
    }
}

/// Compose ranked suggestions from search results, capped at the suggestion
/// limit. Reasons reference the profile's tags and the active mismatches.
pub(crate) fn career_suggestions(
    profiles: &[CareerProfile],
    target_role: &str,
    mismatches: &[String],
) -> Vec<CareerSuggestion> {
    profiles
        .iter()
        .take(SUGGESTION_LIMIT)
        .map(|profile| CareerSuggestion {
            title: profile.title.clone(),
            reason: suggestion_reason(profile, target_role, mismatches),
        })
        .collect()
}

fn suggestion_reason(profile: &CareerProfile, target_role: &str, mismatches: &[String]) -> String {
    let mut reasons = Vec::new();

    if !profile.personality_tags.is_empty() {
        let shown = &profile.personality_tags[..profile.personality_tags.len().min(2)];
        reasons.push(format!(
            "Better matches your personality traits: {}",
            shown.join(", ")
        ));
    }

    if !profile.reality_tags.is_empty() {
        let shown = &profile.reality_tags[..profile.reality_tags.len().min(2)];
        reasons.push(format!(
            "More aligned with your preferred work style: {}",
            shown.join(", ")
        ));
    }

    if mismatches
        .iter()
        .any(|mismatch| mismatch.to_lowercase().contains("commitment"))
    {
        reasons.push("Requires less upfront training and investment".to_string());
    }

    if mismatches
        .iter()
        .any(|mismatch| mismatch.to_lowercase().contains("lifestyle"))
    {
        reasons.push("Offers better work-life balance".to_string());
    }

    if reasons.is_empty() {
        format!("Similar to {target_role} but with different requirements")
    } else {
        reasons.join(". ")
    }
}
