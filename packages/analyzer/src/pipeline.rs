//! Run orchestration: crawl, score, aggregate, recommend, persist.
//!
//! A run moves forward through pending, crawling, analyzing, scoring and a
//! terminal state, with progress checkpoints written to the store after each
//! stage so pollers see movement. A failed crawl does not fail the run: the
//! HTML-dependent pillars are marked errored and the domain-level pillars
//! still execute, producing a partial but COMPLETE result. FAILED is
//! reserved for orchestration itself breaking (store errors, invalid input).

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::competitors;
use crate::crawler::{CrawlResult, Fetcher};
use crate::error::{AnalyzerError, Result};
use crate::llm::{Gateway, ProviderSet};
use crate::recommendations::generate_recommendations;
use crate::scorers::entity::EntityScorer;
use crate::scorers::technical::{probe_aux_files, score_technical_with};
use crate::scorers::{aggregator, ai_visibility, content, eeat, industry, schema};
use crate::store::RunStore;
use crate::types::{
    AnalysisRequest, AnalysisRun, Competitor, PageScore, PillarScore, RunStatus,
};

/// Orchestrates analysis runs against a store and a shared provider pool.
pub struct Analyzer {
    fetcher: Fetcher,
    providers: Arc<ProviderSet>,
    entity: EntityScorer,
    store: Arc<dyn RunStore>,
}

impl Analyzer {
    pub fn new(store: Arc<dyn RunStore>) -> Self {
        Self::with_parts(Fetcher::new(), ProviderSet::from_env(), store)
    }

    /// Construct with explicit parts. Tests inject mock providers here.
    pub fn with_parts(
        fetcher: Fetcher,
        providers: Arc<ProviderSet>,
        store: Arc<dyn RunStore>,
    ) -> Self {
        Self {
            fetcher,
            providers,
            entity: EntityScorer::new(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn RunStore> {
        &self.store
    }

    /// Validate the request and persist a pending run. The caller decides
    /// whether to execute inline or in a spawned task.
    pub async fn start_run(&self, request: AnalysisRequest) -> Result<AnalysisRun> {
        let request = request.normalized()?;
        let run = AnalysisRun::new(&request);
        self.store.create_run(&run).await?;
        info!(run_id = %run.id, url = %run.url, "analysis run created");
        Ok(run)
    }

    /// Create a run and execute it to completion, returning the final record.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisRun> {
        let run = self.start_run(request).await?;
        self.execute_run(run.id).await?;
        self.store
            .get_run(run.id)
            .await?
            .ok_or_else(|| AnalyzerError::Run(format!("run {} vanished mid-flight", run.id)))
    }

    /// Execute one pending run. Internal pipeline errors mark the run FAILED
    /// with the error message before being returned.
    pub async fn execute_run(&self, id: Uuid) -> Result<()> {
        match self.run_pipeline(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(run_id = %id, error = %e, "run failed");
                self.mark_failed(id, &e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, id: Uuid) -> Result<()> {
        let mut run = self
            .store
            .get_run(id)
            .await?
            .ok_or_else(|| AnalyzerError::Run(format!("run {} not found", id)))?;
        if run.status != RunStatus::Pending {
            return Err(AnalyzerError::Run(format!(
                "run {} is not pending (status {:?})",
                id, run.status
            )));
        }

        let gateway = self.providers.gateway();
        let llm = if gateway.is_available() {
            Some(&gateway)
        } else {
            warn!(run_id = %id, "no LLM provider configured, static scoring only");
            None
        };

        self.checkpoint(&mut run, RunStatus::Crawling, 5).await?;
        let crawl = self.fetcher.crawl_page(&run.url).await;
        self.checkpoint(&mut run, RunStatus::Analyzing, 15).await?;

        let (page_score, industry) = if crawl.ok() {
            self.score_full(&mut run, &crawl, llm).await?
        } else {
            warn!(run_id = %id, error = ?crawl.error, "crawl failed, partial analysis");
            self.score_partial(&mut run, &crawl, llm).await?
        };

        self.checkpoint(&mut run, RunStatus::Scoring, 80).await?;
        run.composite_score = Some(page_score.composite);

        let pillar_details = [
            &page_score.content.details,
            &page_score.schema.details,
            &page_score.eeat.details,
            &page_score.technical.details,
        ];
        let mut all_details: Vec<_> = pillar_details.to_vec();
        if let Some(entity) = &page_score.entity {
            all_details.push(&entity.details);
        }
        if let Some(ai) = &page_score.ai_visibility {
            all_details.push(&ai.details);
        }
        run.recommendations = generate_recommendations(&all_details);
        run.page_scores = vec![page_score];
        self.checkpoint(&mut run, RunStatus::Scoring, 85).await?;

        if crawl.ok() {
            if let Some(gateway) = llm {
                run.competitors = self.find_competitors(&crawl, &industry, gateway).await;
            }
        }

        run.llm_call_logs = gateway.sink().drain().await;
        run.status = RunStatus::Complete;
        run.progress = 100;
        run.updated_at = Utc::now();
        self.store.update_run(&run).await?;
        info!(
            run_id = %id,
            composite = ?run.composite_score,
            recommendations = run.recommendations.len(),
            competitors = run.competitors.len(),
            "analysis run complete"
        );
        Ok(())
    }

    /// All six pillars against a healthy crawl. Content, schema and technical
    /// run first; the three LLM-heavy pillars run concurrently afterwards.
    async fn score_full(
        &self,
        run: &mut AnalysisRun,
        crawl: &CrawlResult,
        llm: Option<&Gateway>,
    ) -> Result<(PageScore, String)> {
        let industry = match crawl.document() {
            Some(doc) => industry::classify_industry(&doc, &crawl.text),
            None => "default".to_string(),
        };
        info!(run_id = %run.id, industry = %industry, "industry classified");

        let content = content::score_content(crawl);
        self.checkpoint(run, RunStatus::Analyzing, 25).await?;

        let schema = schema::score_schema(crawl);
        self.checkpoint(run, RunStatus::Analyzing, 35).await?;

        let aux = probe_aux_files(&self.fetcher, &crawl.url).await;
        let technical = score_technical_with(crawl, &aux);
        self.checkpoint(run, RunStatus::Analyzing, 45).await?;

        let (eeat, entity, (ai, probes)) = tokio::join!(
            eeat::score_eeat(crawl, llm),
            self.entity.score(crawl, &industry, llm),
            ai_visibility::score_ai_visibility(crawl, llm),
        );
        self.checkpoint(run, RunStatus::Analyzing, 55).await?;
        self.checkpoint(run, RunStatus::Analyzing, 65).await?;
        self.checkpoint(run, RunStatus::Analyzing, 75).await?;

        run.ai_probes = probes;

        let composite = aggregator::compute_composite(
            content.score,
            schema.score,
            eeat.score,
            technical.score,
            entity.score,
            ai.score,
            &industry,
        );

        Ok((
            PageScore {
                url: crawl.url.clone(),
                content,
                schema,
                eeat,
                technical,
                entity: Some(entity),
                ai_visibility: Some(ai),
                composite,
            },
            industry,
        ))
    }

    /// Degraded path for a failed crawl. HTML-dependent pillars are errored;
    /// technical scores from the root-file probes alone; entity and
    /// AI-visibility fall back to domain-derived brand signals.
    async fn score_partial(
        &self,
        run: &mut AnalysisRun,
        crawl: &CrawlResult,
        llm: Option<&Gateway>,
    ) -> Result<(PageScore, String)> {
        let crawl_message = crawl
            .error
            .clone()
            .unwrap_or_else(|| "crawl failed".to_string());

        let content = PillarScore::errored(crawl_message.clone());
        self.checkpoint(run, RunStatus::Analyzing, 25).await?;
        let schema = PillarScore::errored(crawl_message.clone());
        self.checkpoint(run, RunStatus::Analyzing, 35).await?;

        let aux = probe_aux_files(&self.fetcher, &crawl.url).await;
        let mut technical = score_technical_with(crawl, &aux);
        if let Some(key) = crawl.crawl_error().and_then(|e| e.finding_key()) {
            technical.details.finding(key);
        }
        technical.details.note = Some(format!(
            "Partial results: {}. Content, schema, and E-E-A-T could not be analyzed.",
            crawl_message
        ));
        self.checkpoint(run, RunStatus::Analyzing, 45).await?;

        let eeat = PillarScore::errored(crawl_message);
        let (entity, (ai, probes)) = tokio::join!(
            self.entity.score_domain_only(&crawl.url, "default", llm),
            ai_visibility::score_ai_visibility_domain_only(&crawl.url, llm),
        );
        self.checkpoint(run, RunStatus::Analyzing, 55).await?;
        self.checkpoint(run, RunStatus::Analyzing, 65).await?;
        self.checkpoint(run, RunStatus::Analyzing, 75).await?;

        run.ai_probes = probes;

        let composite = aggregator::compute_composite(
            0.0,
            0.0,
            0.0,
            technical.score,
            entity.score,
            ai.score,
            "default",
        );

        Ok((
            PageScore {
                url: crawl.url.clone(),
                content,
                schema,
                eeat,
                technical,
                entity: Some(entity),
                ai_visibility: Some(ai),
                composite,
            },
            "default".to_string(),
        ))
    }

    async fn find_competitors(
        &self,
        crawl: &CrawlResult,
        industry: &str,
        gateway: &Gateway,
    ) -> Vec<Competitor> {
        let leads = competitors::discover_competitors(gateway, crawl).await;
        if leads.is_empty() {
            return Vec::new();
        }
        competitors::score_competitors(&self.fetcher, leads, industry).await
    }

    /// Persist a forward-only status/progress checkpoint. Progress never
    /// moves backwards even when a stage re-reports a smaller value.
    async fn checkpoint(
        &self,
        run: &mut AnalysisRun,
        status: RunStatus,
        progress: u8,
    ) -> Result<()> {
        if status.rank() < run.status.rank() {
            return Err(AnalyzerError::Run(format!(
                "illegal transition {:?} -> {:?} for run {}",
                run.status, status, run.id
            )));
        }
        run.status = status;
        run.progress = run.progress.max(progress);
        run.updated_at = Utc::now();
        self.store.update_run(run).await
    }

    /// Best effort: a run that errors out should still be visible as FAILED.
    async fn mark_failed(&self, id: Uuid, message: &str) {
        let Ok(Some(mut run)) = self.store.get_run(id).await else {
            return;
        };
        if run.status.is_terminal() {
            return;
        }
        run.status = RunStatus::Failed;
        run.error_message = Some(message.to_string());
        run.updated_at = Utc::now();
        if let Err(e) = self.store.update_run(&run).await {
            error!(run_id = %id, error = %e, "could not record run failure");
        }
    }
}
