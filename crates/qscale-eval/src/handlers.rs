//! The answer-sheet-saved handler chain and its composition.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use qscale_calc::engine::CalculationEngine;
use qscale_core::models::event::{
    AnswersheetSavedData, MESSAGE_TYPE_ANSWERSHEET_SAVED, MessageEnvelope,
};
use qscale_core::models::report::InterpretReport;
use qscale_store::{
    AnswerSheetStore, BoxFuture, InterpretReportStore, MedicalScaleProvider,
    QuestionnaireProvider, StoreError,
};

use crate::dispatcher::{EventState, MessageDispatcher, MessageProcessor};
use crate::error::EvalError;
use crate::factors::FactorAggregator;
use crate::interpret::ContentGenerator;
use crate::pool::{DEFAULT_ANSWER_CONCURRENCY, DEFAULT_FACTOR_CONCURRENCY, WorkerPool};
use crate::scorer::AnswerScorer;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// External services the handlers load from and persist to.
#[derive(Clone)]
pub struct Collaborators {
    pub questionnaires: Arc<dyn QuestionnaireProvider>,
    pub answer_sheets: Arc<dyn AnswerSheetStore>,
    pub medical_scales: Arc<dyn MedicalScaleProvider>,
    pub reports: Arc<dyn InterpretReportStore>,
}

impl Collaborators {
    /// All four roles served by one store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: QuestionnaireProvider
            + AnswerSheetStore
            + MedicalScaleProvider
            + InterpretReportStore
            + 'static,
    {
        Self {
            questionnaires: store.clone(),
            answer_sheets: store.clone(),
            medical_scales: store.clone(),
            reports: store,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub answer_concurrency: usize,
    pub factor_concurrency: usize,
    pub call_timeout: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            answer_concurrency: DEFAULT_ANSWER_CONCURRENCY,
            factor_concurrency: DEFAULT_FACTOR_CONCURRENCY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Run a collaborator call under a deadline.
pub async fn with_deadline<T>(
    operation: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, EvalError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(EvalError::Collaborator { operation, source }),
        Err(_) => Err(EvalError::Timeout { operation, timeout }),
    }
}

/// One step of the chain run for every saved answer sheet.
pub trait AnswersheetSavedHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle<'a>(&'a self, data: &'a AnswersheetSavedData) -> BoxFuture<'a, Result<(), EvalError>>;
}

/// Handlers run strictly in order; the first failure stops the chain.
#[derive(Default, Clone)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn AnswersheetSavedHandler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: Arc<dyn AnswersheetSavedHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub async fn run(&self, data: &AnswersheetSavedData) -> Result<(), EvalError> {
        for handler in &self.handlers {
            debug!(
                handler = handler.name(),
                answer_sheet_id = data.answer_sheet_id,
                state = %EventState::Executing,
                "running handler"
            );
            handler
                .handle(data)
                .await
                .map_err(|e| EvalError::Handler {
                    handler: handler.name(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}

/// Processor for `answersheet.saved` messages.
pub struct AnswersheetSavedProcessor {
    chain: HandlerChain,
}

impl AnswersheetSavedProcessor {
    pub fn new(chain: HandlerChain) -> Self {
        Self { chain }
    }
}

impl MessageProcessor for AnswersheetSavedProcessor {
    fn message_type(&self) -> &str {
        MESSAGE_TYPE_ANSWERSHEET_SAVED
    }

    fn process<'a>(
        &'a self,
        envelope: &'a MessageEnvelope,
        _payload: &'a [u8],
    ) -> BoxFuture<'a, Result<(), EvalError>> {
        Box::pin(async move {
            let data =
                AnswersheetSavedData::from_envelope(envelope).map_err(EvalError::InvalidMessage)?;
            info!(
                answer_sheet_id = data.answer_sheet_id,
                questionnaire_code = %data.questionnaire_code,
                questionnaire_version = %data.questionnaire_version,
                "answer sheet saved"
            );
            self.chain.run(&data).await
        })
    }
}

/// Scores every answer, totals the sheet, and persists both.
pub struct CalcAnswerSheetScoreHandler {
    collaborators: Collaborators,
    scorer: AnswerScorer,
    call_timeout: Duration,
}

impl CalcAnswerSheetScoreHandler {
    pub fn new(collaborators: Collaborators, scorer: AnswerScorer, call_timeout: Duration) -> Self {
        Self {
            collaborators,
            scorer,
            call_timeout,
        }
    }
}

impl AnswersheetSavedHandler for CalcAnswerSheetScoreHandler {
    fn name(&self) -> &'static str {
        "calc_answersheet_score"
    }

    fn handle<'a>(&'a self, data: &'a AnswersheetSavedData) -> BoxFuture<'a, Result<(), EvalError>> {
        Box::pin(async move {
            let started = Instant::now();
            let c = &self.collaborators;

            let mut sheet = with_deadline(
                "load answer sheet",
                self.call_timeout,
                c.answer_sheets.get_answer_sheet(data.answer_sheet_id),
            )
            .await?;

            let questionnaire = with_deadline(
                "load questionnaire",
                self.call_timeout,
                c.questionnaires
                    .get_questionnaire(&data.questionnaire_code, &data.questionnaire_version),
            )
            .await?;
            let load_elapsed = started.elapsed();

            let calc_started = Instant::now();
            let summary = self
                .scorer
                .score_answers(&mut sheet, Arc::new(questionnaire))
                .await;
            let total = self.scorer.score_total(&mut sheet);
            let calc_elapsed = calc_started.elapsed();

            let save_started = Instant::now();
            with_deadline(
                "save answer sheet scores",
                self.call_timeout,
                c.answer_sheets
                    .save_answer_sheet_scores(sheet.id, total, &sheet.answers),
            )
            .await?;

            info!(
                answer_sheet_id = sheet.id,
                total_score = total,
                scored = summary.scored,
                failed = summary.failed,
                load_ms = load_elapsed.as_millis() as u64,
                calc_ms = calc_elapsed.as_millis() as u64,
                save_ms = save_started.elapsed().as_millis() as u64,
                total_ms = started.elapsed().as_millis() as u64,
                "answer sheet scores saved"
            );
            Ok(())
        })
    }
}

/// Computes factor scores and interpretation text, then persists the report.
pub struct GenerateInterpretReportHandler {
    collaborators: Collaborators,
    aggregator: FactorAggregator,
    content: ContentGenerator,
    call_timeout: Duration,
}

impl GenerateInterpretReportHandler {
    pub fn new(
        collaborators: Collaborators,
        aggregator: FactorAggregator,
        content: ContentGenerator,
        call_timeout: Duration,
    ) -> Self {
        Self {
            collaborators,
            aggregator,
            content,
            call_timeout,
        }
    }
}

impl AnswersheetSavedHandler for GenerateInterpretReportHandler {
    fn name(&self) -> &'static str {
        "generate_interpret_report"
    }

    fn handle<'a>(&'a self, data: &'a AnswersheetSavedData) -> BoxFuture<'a, Result<(), EvalError>> {
        Box::pin(async move {
            let started = Instant::now();
            let c = &self.collaborators;

            let (sheet, scale) = tokio::try_join!(
                with_deadline(
                    "load answer sheet",
                    self.call_timeout,
                    c.answer_sheets.get_answer_sheet(data.answer_sheet_id),
                ),
                with_deadline(
                    "load medical scale",
                    self.call_timeout,
                    c.medical_scales
                        .get_medical_scale_by_questionnaire_code(&data.questionnaire_code),
                ),
            )?;
            let load_elapsed = started.elapsed();

            let mut report = InterpretReport::for_scale(data.answer_sheet_id, &scale);

            let calc_started = Instant::now();
            self.aggregator
                .compute_factor_scores(&mut report, &sheet, &scale)
                .await;
            let calc_elapsed = calc_started.elapsed();

            let content_started = Instant::now();
            self.content.generate_content(&mut report, &scale);
            self.content.validate_content(&report)?;
            let content_elapsed = content_started.elapsed();

            let save_started = Instant::now();
            let report_id = with_deadline(
                "save interpret report",
                self.call_timeout,
                c.reports.save_interpret_report(&report),
            )
            .await?;

            info!(
                answer_sheet_id = data.answer_sheet_id,
                report_id,
                factors = report.items.len(),
                load_ms = load_elapsed.as_millis() as u64,
                calc_ms = calc_elapsed.as_millis() as u64,
                content_ms = content_elapsed.as_millis() as u64,
                save_ms = save_started.elapsed().as_millis() as u64,
                total_ms = started.elapsed().as_millis() as u64,
                "interpret report saved"
            );
            Ok(())
        })
    }
}

/// Wire the full pipeline: one pool per stage, the two-handler chain, and
/// a dispatcher with the `answersheet.saved` processor registered.
pub fn build_dispatcher(
    collaborators: Collaborators,
    engine: CalculationEngine,
    options: PipelineOptions,
) -> MessageDispatcher {
    let answer_pool = WorkerPool::new("answers", options.answer_concurrency);
    let factor_pool = WorkerPool::new("factors", options.factor_concurrency);

    let chain = HandlerChain::new()
        .with(Arc::new(CalcAnswerSheetScoreHandler::new(
            collaborators.clone(),
            AnswerScorer::new(engine.clone(), answer_pool),
            options.call_timeout,
        )))
        .with(Arc::new(GenerateInterpretReportHandler::new(
            collaborators,
            FactorAggregator::new(engine, factor_pool),
            ContentGenerator::new(),
            options.call_timeout,
        )));

    let mut dispatcher = MessageDispatcher::new();
    dispatcher.register(Arc::new(AnswersheetSavedProcessor::new(chain)));
    dispatcher
}
