use crate::cli::SourceArgs;
use crate::infra::apply_sources;
use clap::Args;
use clarification::config::AppConfig;
use clarification::error::AppError;
use clarification::telemetry;
use clarification::explorer::narrative::NarrativeSubject;
use clarification::explorer::session::SessionEditState;
use clarification::explorer::views::CompanyCardView;
use clarification::explorer::{
    CompanyStore, HttpChatTransport, NarrativeGenerator, Prediction, Predictor, RatingPredictor,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Company name exactly as it appears in the dataset
    pub(crate) company: String,
    /// Also request analyst commentary for the stored scores
    #[arg(long)]
    pub(crate) analyze: bool,
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

pub(crate) async fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let InspectArgs {
        company,
        analyze,
        sources,
    } = args;

    let mut config = AppConfig::load()?;
    apply_sources(&mut config, sources);
    telemetry::init(&config.telemetry)?;

    let store = CompanyStore::from_path(&config.data.companies_csv)?;
    let record = store.require(&company)?;
    let predictor = Predictor::load(&config.model.model_path, &config.model.scaler_path)?;

    let card = CompanyCardView::build(record, &SessionEditState::new(record));
    let scores = record.score_vector();
    let prediction = Prediction::from_classes(predictor.predict(&scores));

    println!("{}", card.name);
    println!(
        "Rating: {} ({}/{}) {}",
        card.rating.letter, card.rating.value, card.rating.max, card.rating.delta.text
    );
    println!("Industry: {}", card.industry);
    println!("GICS sub-industry: {}", card.gics_sub_industry);
    println!("Pillars:");
    for pillar in &card.pillars {
        println!("  - {}: {:.1}", pillar.label, pillar.value);
    }
    println!("Scores:");
    for slider in &card.sliders {
        println!("  - {}: {:.1}", slider.label, slider.value);
    }
    println!("Score Prediction: {}", prediction.label());

    match record.stored_analysis() {
        Some(text) => println!("\nStored analysis:\n{text}"),
        None => println!("\nStored analysis: none"),
    }

    if analyze {
        let transport = HttpChatTransport::new(&config.narrative)?;
        let narrator = NarrativeGenerator::new(Arc::new(transport), config.narrative.model.clone());
        let subject = NarrativeSubject {
            company: record.name.as_str(),
            rating: record.rating(),
            scores: &scores,
        };
        let outcome = narrator.analyze(&subject).await;
        println!("\nAnalysis summary:\n{}", outcome.into_text());
    }

    Ok(())
}
