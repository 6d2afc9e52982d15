use crate::infra::{
    default_scoring_config, load_catalog, InMemorySessionRepository, SeededCareerDirectory,
};
use clap::Args;
use reality_coach::error::AppError;
use reality_coach::workflows::coaching::{CoachingService, SessionIntake};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Target occupation under consideration
    #[arg(long, default_value = "Registered Nurse")]
    pub(crate) role: String,
    /// Two-letter state code
    #[arg(long, default_value = "CA")]
    pub(crate) state: String,
    /// Age bracket recorded at intake
    #[arg(long, default_value = "25-34")]
    pub(crate) age_range: String,
    /// Whether the candidate already holds relevant qualifications
    #[arg(long)]
    pub(crate) has_quals: bool,
    /// Answer "no" to every question instead of "yes"
    #[arg(long)]
    pub(crate) pessimist: bool,
    /// Hydrate the question catalog from a CSV export instead of the seeds
    #[arg(long)]
    pub(crate) templates_csv: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        role,
        state,
        age_range,
        has_quals,
        pessimist,
        templates_csv,
    } = args;

    let repository = Arc::new(InMemorySessionRepository::default());
    let catalog = Arc::new(load_catalog(templates_csv.as_deref())?);
    let directory = Arc::new(SeededCareerDirectory::seeded());
    let service = CoachingService::new(repository, catalog, directory, default_scoring_config());

    println!("Career reality coaching demo");
    println!(
        "Candidate: {role} in {state} ({age_range}, qualifications: {})",
        if has_quals { "yes" } else { "no" }
    );
    let answer_value = !pessimist;
    println!(
        "Answer script: every question gets a \"{}\"",
        if answer_value { "yes" } else { "no" }
    );

    let intake = SessionIntake {
        target_role: role,
        state,
        age_range,
        has_quals,
        constraints: String::new(),
    };
    let started = match service.start_session(intake) {
        Ok(started) => started,
        Err(err) => {
            println!("  Intake rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Session {} opened ({})",
        started.session_id,
        started.status.label()
    );

    loop {
        let issued = match service.next_question(&started.session_id) {
            Ok(issued) => issued,
            Err(err) => {
                println!("  Question selection unavailable: {err}");
                return Ok(());
            }
        };
        println!(
            "\nQ{} [{} | weight {}] {}",
            issued.question.order,
            issued.question.bucket.label(),
            issued.question.weight,
            issued.question.text
        );

        let recorded = match service.submit_answer(
            &started.session_id,
            &issued.question.id,
            answer_value,
            None,
        ) {
            Ok(recorded) => recorded,
            Err(err) => {
                println!("  Answer rejected: {err}");
                return Ok(());
            }
        };
        println!(
            "A{}: {} -> fit {}% ({}) | confidence {:.0}%",
            issued.question.order,
            if recorded.answer.value { "yes" } else { "no" },
            recorded.scoring.fit_score,
            recorded.scoring.color.label(),
            recorded.scoring.confidence * 100.0
        );

        if recorded.done {
            if let Some(reason) = recorded.stop_reason {
                println!("\nSession stopped: {reason}");
            }
            break;
        }
    }

    let verdict = match service.verdict(&started.session_id) {
        Ok(verdict) => verdict,
        Err(err) => {
            println!("  Verdict unavailable: {err}");
            return Ok(());
        }
    };

    println!("\nVerdict: {} ({}%)", verdict.color.label(), verdict.fit_score);
    println!("{}", verdict.summary);
    println!(
        "Bucket scores: personality {}% | daily {}% | commitment {}% | lifestyle {}%",
        verdict.bucket_scores.personality,
        verdict.bucket_scores.daily,
        verdict.bucket_scores.commitment,
        verdict.bucket_scores.lifestyle
    );

    if verdict.mismatches.is_empty() {
        println!("Mismatches: none");
    } else {
        println!("Mismatches:");
        for mismatch in &verdict.mismatches {
            println!("  - {mismatch}");
        }
    }

    println!("Next steps:");
    for step in &verdict.next_steps {
        println!("  - {step}");
    }

    if verdict.alt_careers.is_empty() {
        println!("Alternative careers: none suggested");
    } else {
        println!("Alternative careers:");
        for suggestion in &verdict.alt_careers {
            println!("  - {}: {}", suggestion.title, suggestion.reason);
        }
    }

    Ok(())
}
