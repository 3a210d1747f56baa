//! Human-machine agreement and evaluation metrics.
//!
//! One evaluation compares every system-score column against the primary
//! human score and tabulates fifteen metric values per score type, in the
//! canonical score-type order. The five human-side values (`N`, `h_mean`,
//! `h_sd`, `h_min`, `h_max`) depend only on the human scores, so they are
//! computed once per evaluation and shared across all score types; exact
//! equality across rows is an invariant, not a coincidence.
//!
//! When a second human score is available, the same machinery produces a
//! human-human baseline over the double-scored subset, which in turn feeds
//! the degradation analysis: how much worse the machine agrees with the
//! first rater than a second human does.
//!
//! Shortened tables are assembled internally as an ordered
//! `(metric, score type)` key list; the flat `metric.score_type` column
//! names exist only at the table boundary.

use std::str::FromStr;

use oxiscore_frame::{
    frame::ItemFrame,
    score::ScoreType,
    table::{Cell, Table},
};
use oxiscore_stats::{
    agreement::{KappaWeights, agreement_percent, kappa},
    correlation::pearson,
    descriptive::{maximum, mean, minimum, sample_std},
};

use crate::error::AnalysisError;

/// One of the fifteen evaluation metric names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Metric {
    /// Number of scored items (the full system-score column length).
    #[display("N")]
    N,
    #[display("h_mean")]
    HMean,
    #[display("h_sd")]
    HSd,
    #[display("h_min")]
    HMin,
    #[display("h_max")]
    HMax,
    #[display("sys_mean")]
    SysMean,
    #[display("sys_sd")]
    SysSd,
    #[display("sys_min")]
    SysMin,
    #[display("sys_max")]
    SysMax,
    /// Pearson correlation over the NaN-dropped pairs.
    #[display("corr")]
    Corr,
    /// Quadratic-weighted kappa against rounded system scores.
    #[display("wtkappa")]
    Wtkappa,
    /// Unweighted kappa.
    #[display("kappa")]
    Kappa,
    /// Exact agreement percentage.
    #[display("exact_agr")]
    ExactAgr,
    /// Adjacent (within one point) agreement percentage.
    #[display("adj_agr")]
    AdjAgr,
    /// Standardized mean difference between system and human scores.
    #[display("SMD")]
    Smd,
}

impl Metric {
    /// All metrics in canonical column order.
    pub const ALL: [Metric; 15] = [
        Metric::N,
        Metric::HMean,
        Metric::HSd,
        Metric::HMin,
        Metric::HMax,
        Metric::SysMean,
        Metric::SysSd,
        Metric::SysMin,
        Metric::SysMax,
        Metric::Corr,
        Metric::Wtkappa,
        Metric::Kappa,
        Metric::ExactAgr,
        Metric::AdjAgr,
        Metric::Smd,
    ];

    /// The metrics tracked by the degradation analysis, in output order.
    pub const DEGRADATION: [Metric; 6] = [
        Metric::Corr,
        Metric::Kappa,
        Metric::Wtkappa,
        Metric::ExactAgr,
        Metric::AdjAgr,
        Metric::Smd,
    ];

    /// Metrics that are identical for every score type and therefore keep
    /// their bare names in shortened tables.
    const BARE: [Metric; 3] = [Metric::N, Metric::HMean, Metric::HSd];
}

/// Error for unknown metric names; callers fold it into
/// [`AnalysisError::UnknownMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown metric '{name}'")]
pub struct ParseMetricError {
    pub name: String,
}

impl FromStr for Metric {
    type Err = ParseMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.to_string() == s)
            .ok_or_else(|| ParseMetricError {
                name: s.to_string(),
            })
    }
}

/// Human-side score statistics, computed once per evaluation and shared by
/// every score type so the shared rows are bit-identical.
#[derive(Debug, Clone, Copy)]
pub struct HumanStats {
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
}

impl HumanStats {
    /// Summarize a human score column.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Self {
        HumanStats {
            mean: mean(scores),
            sd: sample_std(scores),
            min: minimum(scores),
            max: maximum(scores),
        }
    }
}

/// The fifteen metric values for one system-score column against one human
/// reference column.
#[derive(Debug, Clone)]
pub struct ScoreMetrics {
    pub n: usize,
    pub h_mean: f64,
    pub h_sd: f64,
    pub h_min: f64,
    pub h_max: f64,
    pub sys_mean: f64,
    pub sys_sd: f64,
    pub sys_min: f64,
    pub sys_max: f64,
    pub corr: f64,
    pub wtkappa: f64,
    pub kappa: f64,
    pub exact_agr: f64,
    pub adj_agr: f64,
    pub smd: f64,
}

impl ScoreMetrics {
    /// Compute all metrics for one (human, system) column pair.
    #[must_use]
    pub fn new(human: &[f64], system: &[f64]) -> Self {
        Self::with_human_stats(HumanStats::from_scores(human), human, system)
    }

    /// Compute all metrics reusing precomputed human-side statistics.
    ///
    /// `N` is the full system-column length; the correlation is computed
    /// over the subset of pairs where both values are present. The count
    /// deliberately over-covers the correlation subset, matching the
    /// long-standing reporting convention.
    #[must_use]
    pub fn with_human_stats(human_stats: HumanStats, human: &[f64], system: &[f64]) -> Self {
        let unweighted_kappa = kappa(human, system, KappaWeights::Unweighted);
        let rounded_system: Vec<f64> = system.iter().map(|v| v.round()).collect();
        let quadratic_weighted_kappa = kappa(human, &rounded_system, KappaWeights::Quadratic);

        let exact_agr = agreement_percent(human, system, 0.0);
        let adj_agr = agreement_percent(human, system, 1.0);

        let (clean_human, clean_system): (Vec<f64>, Vec<f64>) = human
            .iter()
            .zip(system)
            .filter(|(h, s)| !h.is_nan() && !s.is_nan())
            .map(|(h, s)| (*h, *s))
            .unzip();
        let corr = pearson(&clean_human, &clean_system);

        let sys_mean = mean(system);
        let sys_sd = sample_std(system);
        let smd = (sys_mean - human_stats.mean)
            / ((sys_sd * sys_sd + human_stats.sd * human_stats.sd) / 2.0).sqrt();

        ScoreMetrics {
            n: system.len(),
            h_mean: human_stats.mean,
            h_sd: human_stats.sd,
            h_min: human_stats.min,
            h_max: human_stats.max,
            sys_mean,
            sys_sd,
            sys_min: minimum(system),
            sys_max: maximum(system),
            corr,
            wtkappa: quadratic_weighted_kappa,
            kappa: unweighted_kappa,
            exact_agr,
            adj_agr,
            smd,
        }
    }

    /// Value of one metric; `N` is converted to `f64`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::N => self.n as f64,
            Metric::HMean => self.h_mean,
            Metric::HSd => self.h_sd,
            Metric::HMin => self.h_min,
            Metric::HMax => self.h_max,
            Metric::SysMean => self.sys_mean,
            Metric::SysSd => self.sys_sd,
            Metric::SysMin => self.sys_min,
            Metric::SysMax => self.sys_max,
            Metric::Corr => self.corr,
            Metric::Wtkappa => self.wtkappa,
            Metric::Kappa => self.kappa,
            Metric::ExactAgr => self.exact_agr,
            Metric::AdjAgr => self.adj_agr,
            Metric::Smd => self.smd,
        }
    }

    fn cell(&self, metric: Metric) -> Cell {
        if metric == Metric::N {
            Cell::from(self.n)
        } else {
            Cell::Num(self.get(metric))
        }
    }
}

/// Per-score-type metric selection for shortened tables.
#[derive(Debug, Clone)]
pub struct MetricSelection {
    /// `(score type, metrics)` pairs in presentation order.
    pub per_score_type: Vec<(ScoreType, Vec<Metric>)>,
}

impl MetricSelection {
    /// The recommended shortened selection: a few distribution/association
    /// numbers from the trimmed score, agreement numbers from the
    /// trimmed-and-rounded score.
    #[must_use]
    pub fn recommended(use_scaled: bool) -> Self {
        MetricSelection {
            per_score_type: vec![
                (
                    ScoreType::trim(use_scaled),
                    vec![
                        Metric::N,
                        Metric::HMean,
                        Metric::HSd,
                        Metric::SysMean,
                        Metric::SysSd,
                        Metric::Corr,
                        Metric::Smd,
                    ],
                ),
                (
                    ScoreType::trim_round(use_scaled),
                    vec![
                        Metric::SysMean,
                        Metric::SysSd,
                        Metric::Wtkappa,
                        Metric::Kappa,
                        Metric::ExactAgr,
                        Metric::AdjAgr,
                        Metric::Smd,
                    ],
                ),
            ],
        }
    }

    /// Parse a custom selection from `(score type, metric names)` pairs,
    /// enumerating every invalid name against the valid set.
    pub fn parse(entries: &[(String, Vec<String>)]) -> Result<Self, AnalysisError> {
        let invalid_score_types: Vec<String> = entries
            .iter()
            .filter(|(name, _)| ScoreType::from_str(name).is_err())
            .map(|(name, _)| name.clone())
            .collect();
        if !invalid_score_types.is_empty() {
            return Err(AnalysisError::UnknownScoreTypes {
                invalid: invalid_score_types,
                valid: ScoreType::ALL.iter().map(ToString::to_string).collect(),
            });
        }

        let invalid_metrics: Vec<String> = entries
            .iter()
            .flat_map(|(_, metrics)| metrics)
            .filter(|name| Metric::from_str(name).is_err())
            .cloned()
            .collect();
        if !invalid_metrics.is_empty() {
            return Err(AnalysisError::UnknownMetrics {
                invalid: invalid_metrics,
                valid: Metric::ALL.iter().map(ToString::to_string).collect(),
            });
        }

        let per_score_type = entries
            .iter()
            .map(|(name, metrics)| {
                let score_type = ScoreType::from_str(name).expect("validated above");
                let metrics = metrics
                    .iter()
                    .map(|m| Metric::from_str(m).expect("validated above"))
                    .collect();
                (score_type, metrics)
            })
            .collect();
        Ok(MetricSelection { per_score_type })
    }
}

/// A flattened one-row metric table: an ordered list of
/// `(metric, score type)` keys and their values. Score-type-invariant
/// entries carry no score type and keep their bare metric name.
#[derive(Debug, Clone)]
pub struct ShortMetrics {
    pub entries: Vec<(Metric, Option<ScoreType>, f64)>,
}

impl ShortMetrics {
    /// The flat column names, `metric.score_type` or the bare metric name.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(metric, score_type, _)| match score_type {
                Some(score_type) => format!("{metric}.{score_type}"),
                None => metric.to_string(),
            })
            .collect()
    }

    /// Render as a single-row table with the given row label.
    #[must_use]
    pub fn to_table(&self, index_name: &str, label: &str) -> Table {
        let mut table = Table::new(index_name, self.column_names());
        let cells = self.entries.iter().map(|(_, _, value)| Cell::Num(*value)).collect();
        table.push_row(label, cells);
        table
    }
}

/// Extract a shortened metric list from full evaluation rows.
///
/// Fails when the selection asks for a score type the evaluation did not
/// produce. Score-type-invariant metrics are emitted once, on first
/// occurrence, under their bare names.
pub fn filter_metrics(
    rows: &[(ScoreType, ScoreMetrics)],
    selection: &MetricSelection,
) -> Result<ShortMetrics, AnalysisError> {
    let mut entries: Vec<(Metric, Option<ScoreType>, f64)> = Vec::new();
    for (score_type, metrics) in &selection.per_score_type {
        let Some((_, row)) = rows.iter().find(|(st, _)| st == score_type) else {
            return Err(AnalysisError::MissingSelectedScoreType {
                score_type: *score_type,
            });
        };
        for metric in metrics {
            let key_score_type = if Metric::BARE.contains(metric) {
                None
            } else {
                Some(*score_type)
            };
            if key_score_type.is_none()
                && entries
                    .iter()
                    .any(|(m, st, _)| m == metric && st.is_none())
            {
                continue;
            }
            entries.push((*metric, key_score_type, row.get(*metric)));
        }
    }
    Ok(ShortMetrics { entries })
}

/// Options controlling one evaluation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationOptions {
    /// Also produce the shortened one-row table.
    pub compute_shortened: bool,
    /// Pick the scaled branch of the pipeline for shortened tables and
    /// confusion/distribution analyses.
    pub use_scaled: bool,
    /// Compute the human-human baseline over the double-scored subset.
    pub include_second_score: bool,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Full metrics per score type, in canonical order, existing columns
    /// only.
    pub by_score_type: Vec<(ScoreType, ScoreMetrics)>,
    /// The shortened selection, when requested.
    pub shortened: Option<ShortMetrics>,
    /// Human-human baseline metrics (`sc1` as reference, `sc2` as the
    /// "system"), when a second score was requested.
    pub human_human: Option<ScoreMetrics>,
}

impl Evaluation {
    /// The full table: one row per score type, fifteen metric columns.
    #[must_use]
    pub fn full_table(&self) -> Table {
        let mut table = Table::new(
            "score_type",
            Metric::ALL.iter().map(ToString::to_string),
        );
        for (score_type, metrics) in &self.by_score_type {
            let cells = Metric::ALL.iter().map(|m| metrics.cell(*m)).collect();
            table.push_row(score_type.to_string(), cells);
        }
        table
    }

    /// The human-human baseline as a single-row table with `h_*`/`sys_*`
    /// columns renamed to `h1_*`/`h2_*`.
    #[must_use]
    pub fn human_human_table(&self) -> Option<Table> {
        self.human_human
            .as_ref()
            .map(|metrics| human_human_row("", metrics))
    }
}

/// Render one human-human baseline row under the given label.
#[must_use]
pub fn human_human_row(label: &str, metrics: &ScoreMetrics) -> Table {
    let columns = Metric::ALL.iter().map(|metric| {
        metric
            .to_string()
            .replace("h_", "h1_")
            .replace("sys_", "h2_")
    });
    let mut table = Table::new("", columns);
    let cells = Metric::ALL.iter().map(|m| metrics.cell(*m)).collect();
    table.push_row(label, cells);
    table
}

/// Evaluate every present system-score column against the primary human
/// score.
///
/// The human-side statistics are computed once and shared by all rows. With
/// `include_second_score`, the human-human baseline is computed over the
/// double-scored subset only, while the human-machine rows use the whole
/// frame.
pub fn compute_metrics(
    frame: &ItemFrame,
    options: EvaluationOptions,
) -> Result<Evaluation, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "evaluation metrics".to_string(),
        });
    }
    let human = frame.sc1_column()?;
    let human_stats = HumanStats::from_scores(&human);

    let score_types = frame.present_score_types();
    if score_types.is_empty() {
        return Err(AnalysisError::NoScoreColumns);
    }

    let by_score_type: Vec<(ScoreType, ScoreMetrics)> = score_types
        .into_iter()
        .map(|score_type| {
            let system = frame.score_column(score_type)?;
            Ok((
                score_type,
                ScoreMetrics::with_human_stats(human_stats, &human, &system),
            ))
        })
        .collect::<Result<_, AnalysisError>>()?;

    let human_human = if options.include_second_score {
        let double_scored = frame.filtered(|item| item.sc2.is_some());
        let human1 = double_scored.sc1_column()?;
        let human2: Vec<f64> = double_scored
            .sc2_column()
            .into_iter()
            .map(|v| v.expect("filtered to double-scored items"))
            .collect();
        Some(ScoreMetrics::new(&human1, &human2))
    } else {
        None
    };

    let shortened = if options.compute_shortened {
        Some(filter_metrics(
            &by_score_type,
            &MetricSelection::recommended(options.use_scaled),
        )?)
    } else {
        None
    };

    Ok(Evaluation {
        by_score_type,
        shortened,
        human_human,
    })
}

/// Per-group evaluation tables.
#[derive(Debug, Clone)]
pub struct GroupEvaluation {
    /// Shortened metrics, one row per metric key, one column per group.
    pub shortened: Table,
    /// One human-human baseline row per group, when a second score was
    /// requested.
    pub human_human: Option<Table>,
}

/// Evaluate per subgroup value (plus the synthetic `"All data"` group),
/// transposed so groups become columns.
pub fn evaluate_by_group(
    frame: &ItemFrame,
    subgroup: &str,
    use_scaled: bool,
    include_second_score: bool,
) -> Result<GroupEvaluation, AnalysisError> {
    if frame.is_empty() {
        return Err(AnalysisError::EmptyFrame {
            context: "evaluation by group".to_string(),
        });
    }
    let partitions = frame.group_partitions(subgroup)?;

    let options = EvaluationOptions {
        compute_shortened: true,
        use_scaled,
        include_second_score,
    };
    let mut group_names = Vec::with_capacity(partitions.len());
    let mut group_shorts = Vec::with_capacity(partitions.len());
    let mut human_human_rows = Vec::new();
    for (group, group_frame) in &partitions {
        let evaluation = compute_metrics(group_frame, options)?;
        let short = evaluation
            .shortened
            .clone()
            .expect("shortened metrics were requested");
        group_names.push(group.clone());
        group_shorts.push(short);
        if let Some(human_human) = &evaluation.human_human {
            human_human_rows.push((group.clone(), human_human.clone()));
        }
    }

    let metric_labels = group_shorts[0].column_names();
    let mut shortened = Table::new("", group_names.clone());
    for (row, label) in metric_labels.iter().enumerate() {
        let cells = group_shorts
            .iter()
            .map(|short| Cell::Num(short.entries[row].2))
            .collect();
        shortened.push_row(label.clone(), cells);
    }

    let human_human = if human_human_rows.is_empty() {
        None
    } else {
        let columns: Vec<String> = Metric::ALL
            .iter()
            .map(|metric| {
                metric
                    .to_string()
                    .replace("h_", "h1_")
                    .replace("sys_", "h2_")
            })
            .collect();
        let mut table = Table::new("", columns);
        for (group, metrics) in &human_human_rows {
            let cells = Metric::ALL.iter().map(|m| metrics.cell(*m)).collect();
            table.push_row(group.clone(), cells);
        }
        Some(table)
    };

    Ok(GroupEvaluation {
        shortened,
        human_human,
    })
}

/// Degradation of the six tracked metrics when the machine replaces a
/// second human rater: human-machine value minus human-human baseline, per
/// score type.
///
/// With `use_all_responses` the human-machine side uses the whole frame;
/// otherwise it is restricted to the double-scored subset. The baseline is
/// always computed over double-scored items.
pub fn degradation(frame: &ItemFrame, use_all_responses: bool) -> Result<Table, AnalysisError> {
    let responses = if use_all_responses {
        frame.clone()
    } else {
        frame.filtered(|item| item.sc2.is_some())
    };

    let evaluation = compute_metrics(
        &responses,
        EvaluationOptions {
            compute_shortened: false,
            use_scaled: false,
            include_second_score: true,
        },
    )?;
    let baseline = evaluation
        .human_human
        .as_ref()
        .expect("second score was requested");

    let mut table = Table::new(
        "score_type",
        Metric::DEGRADATION.iter().map(ToString::to_string),
    );
    for (score_type, metrics) in &evaluation.by_score_type {
        let cells = Metric::DEGRADATION
            .iter()
            .map(|m| Cell::Num(metrics.get(*m) - baseline.get(*m)))
            .collect();
        table.push_row(score_type.to_string(), cells);
    }
    Ok(table)
}
