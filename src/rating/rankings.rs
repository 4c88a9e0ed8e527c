use super::bootstrap::BootstrapResult;
use super::scale::{RatingUncertainty, to_ratings};
use super::types::{FitResult, Interval, RankingRow, SortOrder};
use crate::config::settings::ScaleSettings;
use crate::errors::{RatingError, RatingResult};
use crate::matrix::HeadToHead;

/// Bootstrap spread attached to a ranking table
pub struct Uncertainty<'a> {
    pub bootstrap: &'a BootstrapResult,
    pub ratings: &'a RatingUncertainty,
}

/// One row per competitor, sorted by strength and ranked from 1.
pub fn build_rankings(
    h2h: &HeadToHead,
    fit: &FitResult,
    scale: &ScaleSettings,
    order: SortOrder,
    uncertainty: Option<Uncertainty<'_>>,
) -> RatingResult<Vec<RankingRow>> {
    check_len(h2h.len(), fit.len())?;
    if let Some(u) = &uncertainty {
        check_len(h2h.len(), u.bootstrap.std.len())?;
        check_len(h2h.len(), u.ratings.std.len())?;
    }

    let ratings = to_ratings(&fit.strengths, scale);
    let mut rows = Vec::with_capacity(h2h.len());

    for (index, competitor) in h2h.competitors().iter().enumerate() {
        let total_wins = h2h.total_wins(index)?;
        let total_losses = h2h.total_losses(index)?;
        let total_games = total_wins + total_losses;

        rows.push(RankingRow {
            rank: 0,
            index,
            name: competitor.name.clone(),
            strength: fit.strengths[index],
            log_strength: fit.log_strengths[index],
            rating: ratings[index],
            total_wins,
            total_losses,
            total_games,
            win_rate: win_rate(total_wins, total_games),
            imported_elo: competitor.elo,
            imported_glicko: competitor.glicko,
            strength_uncertainty: uncertainty.as_ref().map(|u| Interval {
                std: u.bootstrap.std[index],
                ci_lower: u.bootstrap.ci_lower[index],
                ci_upper: u.bootstrap.ci_upper[index],
            }),
            rating_uncertainty: uncertainty.as_ref().map(|u| Interval {
                std: u.ratings.std[index],
                ci_lower: u.ratings.ci_lower[index],
                ci_upper: u.ratings.ci_upper[index],
            }),
        });
    }

    sort_rows(&mut rows, order);
    Ok(rows)
}

fn check_len(expected: usize, actual: usize) -> RatingResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(RatingError::DimensionMismatch {
            stage: "rankings",
            expected,
            actual,
        })
    }
}

fn win_rate(wins: u32, games: u32) -> f64 {
    if games > 0 {
        f64::from(wins) / f64::from(games)
    } else {
        0.0
    }
}

fn sort_rows(rows: &mut [RankingRow], order: SortOrder) {
    rows.sort_by(|a, b| match order {
        SortOrder::Descending => b.strength.total_cmp(&a.strength),
        SortOrder::Ascending => a.strength.total_cmp(&b.strength),
    });

    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = position + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::FitSettings;
    use crate::domain::{CompetitorRecord, MatchRecord};
    use crate::rating::bradley_terry::fit_wins;

    fn store() -> HeadToHead {
        let records = vec![
            CompetitorRecord::new("low", 20)
                .with_elo(1100.0)
                .with_opponent("high", MatchRecord::new(3, 17, 0)),
            CompetitorRecord::new("high", 20)
                .with_elo(1300.0)
                .with_opponent("low", MatchRecord::new(17, 3, 0)),
        ];
        HeadToHead::from_records(&records, 0)
    }

    #[test]
    fn test_rows_ranked_by_strength() {
        let h2h = store();
        let fit = fit_wins(h2h.wins(), &FitSettings::default()).unwrap();
        let rows = build_rankings(&h2h, &fit, &ScaleSettings::default(), SortOrder::Descending, None)
            .unwrap();

        assert_eq!(rows[0].name, "high");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].total_wins, 17);
        assert_eq!(rows[0].total_games, 20);
        assert!((rows[0].win_rate - 0.85).abs() < 1e-12);
        assert_eq!(rows[0].imported_elo, Some(1300.0));
        assert!(rows[0].rating > rows[1].rating);
        assert!(rows[0].strength_uncertainty.is_none());
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn test_ascending_order() {
        let h2h = store();
        let fit = fit_wins(h2h.wins(), &FitSettings::default()).unwrap();
        let rows = build_rankings(&h2h, &fit, &ScaleSettings::default(), SortOrder::Ascending, None)
            .unwrap();
        assert_eq!(rows[0].name, "low");
        assert_eq!(rows[0].rank, 1);
    }

    #[test]
    fn test_mismatched_fit_rejected() {
        let h2h = store();
        let fit = fit_wins(&ndarray::Array2::zeros((3, 3)), &FitSettings::default()).unwrap();
        let err = build_rankings(&h2h, &fit, &ScaleSettings::default(), SortOrder::Descending, None);
        assert!(matches!(err, Err(RatingError::DimensionMismatch { .. })));
    }
}
