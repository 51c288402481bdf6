use crate::infra::{seeded_marketplace, DEMO_CANDIDATE, DEMO_EMPLOYER};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use jobmatch::error::AppError;
use jobmatch::workflows::applications::{
    ActorRole, ApplicationLifecycleService, ApplicationStatus, ApplicationSubmission,
    ApplicationView, InterviewDetails, LifecycleConfig, LifecycleServiceError,
    StatusChangeRequest,
};
use jobmatch::workflows::matching::{
    MatchingConfig, MatchingService, PostingImporter, ProfileSnapshot, RankedPosting,
    RecommendationRanker, Recommendations, ScoringEngine, DEFAULT_PREVIEW_LEN,
};
use jobmatch::workflows::trust::{TrustService, TrustStats};
use jobmatch::workflows::{PostingId, UserId};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Replace the seeded postings with a CSV export
    #[arg(long)]
    pub(crate) postings_csv: Option<PathBuf>,
    /// Stop after printing recommendations
    #[arg(long)]
    pub(crate) skip_application: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Posting CSV export (id,created_at,title,description,location,wage_min,wage_max,active)
    #[arg(long)]
    pub(crate) postings_csv: PathBuf,
    /// Desired job category; repeat for several
    #[arg(long = "category")]
    pub(crate) categories: Vec<String>,
    /// Desired hourly wage
    #[arg(long)]
    pub(crate) wage: Option<u32>,
    /// Candidate has customer-service experience
    #[arg(long)]
    pub(crate) customer_service: bool,
    /// Candidate has food-service experience
    #[arg(long)]
    pub(crate) restaurant: bool,
    /// Spoken language; repeat for several
    #[arg(long = "language")]
    pub(crate) languages: Vec<String>,
    /// Home address or area
    #[arg(long)]
    pub(crate) address: Option<String>,
    /// Posting id the candidate already applied to; repeat for several
    #[arg(long = "applied")]
    pub(crate) applied: Vec<String>,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Number of postings shown before "more" (defaults to 5)
    #[arg(long)]
    pub(crate) preview: Option<usize>,
    /// Print every ranked posting instead of the preview
    #[arg(long)]
    pub(crate) full: bool,
}

impl RankArgs {
    fn profile(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            candidate_id: UserId::new("cli-candidate"),
            desired_categories: self.categories.iter().cloned().collect(),
            desired_wage: self.wage,
            customer_service_experience: self.customer_service,
            restaurant_experience: self.restaurant,
            languages: self.languages.iter().cloned().collect(),
            address: self.address.clone(),
        }
    }
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let postings = PostingImporter::from_path(&args.postings_csv)?;
    let applied: HashSet<PostingId> = args.applied.iter().map(PostingId::new).collect();
    let now = args.now.unwrap_or_else(Utc::now);
    let preview_len = args.preview.unwrap_or(DEFAULT_PREVIEW_LEN).max(1);

    let ranker = RecommendationRanker::new(ScoringEngine::default(), preview_len);
    let recommendations = ranker.rank(&args.profile(), &postings, &applied, now);

    println!(
        "Ranked {} of {} postings from {}",
        recommendations.len(),
        postings.len(),
        args.postings_csv.display()
    );
    render_recommendations(&recommendations, args.full);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        now,
        postings_csv,
        skip_application,
    } = args;
    let now = now.unwrap_or_else(Utc::now);

    let market = Arc::new(seeded_marketplace(now));
    if let Some(path) = postings_csv {
        market.replace_postings(PostingImporter::from_path(path)?);
    }
    let matching = MatchingService::new(market.clone(), market.clone(), MatchingConfig::default());
    let lifecycle =
        ApplicationLifecycleService::new(market.clone(), market.clone(), LifecycleConfig::default());
    let trust = TrustService::new(market.clone());

    let candidate = UserId::new(DEMO_CANDIDATE);
    println!("Job matching demo for candidate {candidate}");

    let recommendations = matching.recommendations(&candidate, now).await?;
    println!("\nRecommended postings");
    render_recommendations(&recommendations, false);

    let Some(top) = recommendations.preview().first().cloned() else {
        println!("No open postings to apply to.");
        return Ok(());
    };
    let breakdown = matching.explain(&candidate, &top.posting.id, now).await?;
    println!("\nWhy {} scored {}:", top.posting.id, breakdown.score.value());
    for component in &breakdown.components {
        println!(
            "  - {:?}: +{} ({})",
            component.factor, component.points, component.notes
        );
    }

    if skip_application {
        return Ok(());
    }

    println!("\nApplication lifecycle");
    let application = lifecycle
        .submit(
            ApplicationSubmission {
                posting_id: top.posting.id.clone(),
                candidate_id: candidate.clone(),
                employer_id: UserId::new(DEMO_EMPLOYER),
            },
            now,
        )
        .await?;
    println!(
        "- Submitted {} for {} -> {}",
        application.id, application.posting_id, application.status
    );

    let skipped = lifecycle
        .update_status(
            &application.id,
            employer_step(ApplicationStatus::InterviewScheduled, None),
            now,
        )
        .await;
    if let Err(LifecycleServiceError::Transition(error)) = skipped {
        println!("- Skipping straight to an interview is refused: {error}");
    }

    let steps = [
        (ApplicationStatus::Reviewing, Some("Portfolio looks great")),
        (ApplicationStatus::InterviewScheduled, None),
        (ApplicationStatus::InterviewCompleted, Some("Latte art test passed")),
        (ApplicationStatus::OfferSent, None),
        (ApplicationStatus::Accepted, Some("Welcome to the team")),
    ];
    for (status, feedback) in steps {
        let mut request = employer_step(status, feedback);
        if status == ApplicationStatus::InterviewScheduled {
            request.interview = Some(InterviewDetails {
                scheduled_at: Some(now + Duration::days(2)),
                location: top.posting.location.clone(),
                notes: Some("Bring an apron".to_string()),
            });
        }
        let outcome = lifecycle.update_status(&application.id, request, now).await?;
        println!(
            "- {} -> {} (notify {})",
            outcome.notification.payload.previous_status,
            outcome.application.status,
            outcome.notification.recipient_id
        );
    }

    let stored = lifecycle.get(&application.id).await?;
    match serde_json::to_string_pretty(&ApplicationView::from(&stored)) {
        Ok(json) => println!("  Public application payload:\n{}", json),
        Err(err) => println!("  Public application payload unavailable: {}", err),
    }
    println!("  Notifications queued: {}", market.outbox().len());

    let after = matching.recommendations(&candidate, now).await?;
    println!(
        "\nRecommendations after applying: {} remaining (applied posting excluded)",
        after.len()
    );

    println!("\nTrust profile");
    render_trust(&trust.stats_for(&candidate).await?);

    Ok(())
}

fn employer_step(status: ApplicationStatus, feedback: Option<&str>) -> StatusChangeRequest {
    StatusChangeRequest {
        actor: ActorRole::Employer,
        status,
        feedback: feedback.map(str::to_string),
        interview: None,
    }
}

fn render_recommendations(recommendations: &Recommendations, full: bool) {
    let shown: &[RankedPosting] = if full {
        recommendations.all()
    } else {
        recommendations.preview()
    };
    if shown.is_empty() {
        println!("  (no eligible postings)");
        return;
    }
    for (rank, entry) in shown.iter().enumerate() {
        println!(
            "  {}. [{:>3}] {} | {} | {}",
            rank + 1,
            entry.score.value(),
            entry.posting.id,
            entry.posting.title,
            entry.posting.location.as_deref().unwrap_or("location n/a")
        );
    }
    if !full && recommendations.has_more() {
        println!(
            "  ... {} more (use --full)",
            recommendations.len() - recommendations.preview().len()
        );
    }
}

fn render_trust(stats: &TrustStats) {
    println!("- Level: {}", stats.trust_level);
    println!(
        "- Average rating {:.2} over {} evaluations",
        stats.average_rating, stats.total_evaluations
    );
    println!("- Rehire rate {:.1}%", stats.rehire_rate);
    match stats.last_work_date {
        Some(date) => println!("- Last worked {}", date.date_naive()),
        None => println!("- No completed work yet"),
    }
}
