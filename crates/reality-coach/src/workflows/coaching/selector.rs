use std::collections::BTreeMap;

use super::catalog::{CareerDirectory, CareerFact, QuestionCatalog, QuestionTemplate};
use super::domain::{Bucket, Question, QuestionSource, SessionIntake};
use super::repository::SessionSnapshot;

/// Weight assigned to the generic fallback question when the catalog has
/// nothing to offer for the target bucket.
const FALLBACK_WEIGHT: u8 = 7;

/// Outcome of a selection pass: either a previously issued question that is
/// still awaiting its answer, or a draft for a brand-new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selection {
    Outstanding(Question),
    Draft(QuestionDraft),
}

/// A question ready to be persisted; the service assigns identity and order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub bucket: Bucket,
    pub text: String,
    pub weight: u8,
    pub source: QuestionSource,
}

/// Pick the next question for a session.
///
/// Strict FIFO over issued-but-unanswered questions first; otherwise the
/// priority walk selects the first bucket with no answered question yet,
/// the heaviest active template for that bucket is rendered, and a generic
/// commitment question stands in when the catalog comes up empty.
pub(crate) fn select_next(
    snapshot: &SessionSnapshot,
    catalog: &dyn QuestionCatalog,
    directory: &dyn CareerDirectory,
) -> Selection {
    if let Some(question) = snapshot.first_unanswered() {
        return Selection::Outstanding(question.clone());
    }

    let answered = snapshot.answered_buckets();
    let target = Bucket::PRIORITY
        .into_iter()
        .find(|bucket| !answered.contains(bucket))
        .unwrap_or(Bucket::Personality);

    let intake = &snapshot.session.intake;
    let templates = catalog.active_templates(Some(target)).unwrap_or_default();

    let Some(template) = heaviest(templates) else {
        return Selection::Draft(fallback_draft(&intake.target_role));
    };

    let fact = directory
        .fact(&intake.state, &intake.target_role)
        .unwrap_or(None);
    let context = substitution_context(intake, fact.as_ref());

    Selection::Draft(QuestionDraft {
        bucket: template.bucket,
        text: render_pattern(&template.pattern, &context),
        weight: template.weight,
        source: QuestionSource::Generated,
    })
}

/// Highest weight wins; the first template seen keeps the slot on ties, so a
/// weight-descending catalog preserves its own ordering.
fn heaviest(templates: Vec<QuestionTemplate>) -> Option<QuestionTemplate> {
    let mut best: Option<QuestionTemplate> = None;
    for template in templates {
        match &best {
            Some(current) if template.weight <= current.weight => {}
            _ => best = Some(template),
        }
    }
    best
}

pub(crate) fn fallback_draft(target_role: &str) -> QuestionDraft {
    QuestionDraft {
        bucket: Bucket::Commitment,
        text: format!(
            "Are you prepared to invest significant time and money in training for {target_role}?"
        ),
        weight: FALLBACK_WEIGHT,
        source: QuestionSource::Generated,
    }
}

/// Default values for every named placeholder a catalog pattern may carry.
/// A career fact, when available, overrides the training and cost entries.
pub(crate) fn substitution_context(
    intake: &SessionIntake,
    fact: Option<&CareerFact>,
) -> BTreeMap<&'static str, String> {
    let mut context: BTreeMap<&'static str, String> = BTreeMap::new();
    context.insert("state", intake.state.clone());
    context.insert("role", intake.target_role.clone());
    context.insert("routine_task", "routine administrative tasks".to_string());
    context.insert(
        "exciting_task",
        "the exciting parts you see on TV".to_string(),
    );
    context.insert(
        "physical_demand",
        "lifting 50+ pounds and being on your feet for 8+ hours".to_string(),
    );
    context.insert(
        "technology_requirement",
        "learning new software and systems regularly".to_string(),
    );
    context.insert(
        "training_duration",
        "2-4 years of education and training".to_string(),
    );
    context.insert(
        "ongoing_requirement",
        "continuing education and certification maintenance".to_string(),
    );
    context.insert("financial_commitment", "$20,000-60,000".to_string());
    context.insert(
        "schedule_requirement",
        "12-hour shifts including nights and weekends".to_string(),
    );
    context.insert(
        "work_life_balance_challenge",
        "irregular hours and high stress".to_string(),
    );
    context.insert(
        "prerequisite_requirement",
        "a bachelor's degree or equivalent experience".to_string(),
    );
    context.insert(
        "entry_level_position",
        "an entry-level position with lower pay".to_string(),
    );
    context.insert(
        "unpleasant_aspect",
        "dealing with difficult people and stressful situations".to_string(),
    );
    context.insert(
        "boring_task",
        "extensive paperwork and documentation".to_string(),
    );

    if let Some(fact) = fact {
        context.insert("training_duration", fact.training.clone());
        context.insert("financial_commitment", fact.cost.clone());
    }

    context
}

/// Single structured substitution pass over `{name}` placeholders. Unknown
/// placeholders and unterminated braces pass through verbatim.
pub(crate) fn render_pattern(pattern: &str, context: &BTreeMap<&'static str, String>) -> String {
    let mut rendered = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match context.get(name) {
                    Some(value) => rendered.push_str(value),
                    None => {
                        rendered.push('{');
                        rendered.push_str(name);
                        rendered.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                rendered.push('{');
                rest = after;
            }
        }
    }

    rendered.push_str(rest);
    rendered
}
