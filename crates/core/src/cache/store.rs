//! Analysis cache with cooperative batching and run tagging

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::types::{CachedMoveAnalysis, GameCache};
use crate::advice::{situation_key, AdvantageSets, AdviceTable, INITIAL_POSITION_KEY};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::evaluation::Side;
use crate::game::{GameAnalysis, MoveInsight, StrategicPeriod};
use crate::position::BoardPosition;

#[derive(Default)]
struct CacheState {
    games: HashMap<String, Arc<GameCache>>,
    current: Option<String>,
}

pub struct AnalysisCache {
    config: AnalysisConfig,
    table: Arc<AdviceTable>,
    state: Mutex<CacheState>,
    latest_run: AtomicU64,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default(), AdviceTable::shared_builtin())
    }

    pub fn with_config(config: AnalysisConfig, table: Arc<AdviceTable>) -> Self {
        Self {
            config,
            table,
            state: Mutex::new(CacheState::default()),
            latest_run: AtomicU64::new(0),
        }
    }

    /// Analyzes a whole game and makes it the current one.
    ///
    /// Positions are evaluated strictly in order, yielding to the runtime
    /// after every `cache.batch_size` positions. Each call is tagged; if a
    /// newer call started before this one finished, the result is handed back
    /// to the caller but not installed, so a stale run can never replace a
    /// newer game.
    pub async fn analyze_and_cache(
        &self,
        pgn: &str,
        positions: &[String],
        san_moves: &[String],
    ) -> Result<Arc<GameCache>> {
        let run = self.latest_run.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        let created_at = chrono::Utc::now().timestamp_millis();
        let pgn_hash = pgn_hash(pgn);
        let batch_size = self.config.cache.batch_size.max(1);

        let mut insights = Vec::with_capacity(positions.len());
        let mut moves = Vec::with_capacity(positions.len());

        for (index, fen) in positions.iter().enumerate() {
            let position = BoardPosition::from_fen(fen)?;
            let insight = MoveInsight::from_position(
                index,
                san_moves.get(index).cloned(),
                &position,
                &self.config.classification,
            );
            moves.push(self.cached_move(&insight, position.is_initial()));
            insights.push(insight);

            if (index + 1) % batch_size == 0 {
                tracing::debug!(run, analyzed = index + 1, total = positions.len(), "batch done");
                tokio::task::yield_now().await;
            }
        }

        let analysis = GameAnalysis::from_moves(insights, &self.config);
        let cache = Arc::new(GameCache {
            game_id: format!("game_{:08x}_{}_{}", pgn_hash, created_at, run),
            pgn_hash,
            created_at,
            analysis_time_ms: started.elapsed().as_millis() as u64,
            moves,
            periods: analysis.periods,
            critical_moments: analysis.critical_moments,
            game_phases: analysis.game_phases,
            summary: analysis.summary,
        });

        let mut state = self.state.lock();
        if self.latest_run.load(Ordering::SeqCst) == run {
            state.games.insert(cache.game_id.clone(), Arc::clone(&cache));
            state.current = Some(cache.game_id.clone());
            tracing::info!(
                game_id = %cache.game_id,
                moves = cache.moves.len(),
                elapsed_ms = cache.analysis_time_ms,
                "game analysis cached"
            );
        } else {
            tracing::warn!(game_id = %cache.game_id, run, "discarding superseded analysis run");
        }

        Ok(cache)
    }

    fn cached_move(&self, insight: &MoveInsight, is_initial: bool) -> CachedMoveAnalysis {
        let sets = AdvantageSets::from_evaluation(&insight.evaluation, &self.config.advice);
        let leading = sets.leading_side();
        let key = if is_initial {
            INITIAL_POSITION_KEY.to_string()
        } else {
            situation_key(sets.of(leading), sets.of(leading.opponent()))
        };

        CachedMoveAnalysis {
            index: insight.index,
            san: insight.san.clone(),
            fen: insight.fen.clone(),
            evaluation: insight.evaluation.clone(),
            total_advantage: insight.total_advantage,
            dominant_factor: insight.dominant_factor,
            advantage_color: insight.advantage_color,
            strength: insight.strength,
            white_advice: self.table.perspective_advice(&sets, Side::White, is_initial),
            black_advice: self.table.perspective_advice(&sets, Side::Black, is_initial),
            white_advantages: sets.white,
            black_advantages: sets.black,
            situation_key: key,
        }
    }

    /// Record for half-move `index` of the current game. `None` when no game
    /// has been analyzed or the index is out of range.
    pub fn get_move_analysis(&self, index: usize) -> Option<CachedMoveAnalysis> {
        self.current_game()?.move_analysis(index).cloned()
    }

    pub fn period_at(&self, index: usize) -> Option<StrategicPeriod> {
        self.current_game()?.period_at(index).cloned()
    }

    pub fn current_game(&self) -> Option<Arc<GameCache>> {
        let state = self.state.lock();
        let id = state.current.as_ref()?;
        state.games.get(id).cloned()
    }

    pub fn game(&self, game_id: &str) -> Option<Arc<GameCache>> {
        self.state.lock().games.get(game_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops the current game only.
    pub fn clear_current(&self) {
        let mut state = self.state.lock();
        if let Some(id) = state.current.take() {
            state.games.remove(&id);
        }
    }

    pub fn clear_all(&self) {
        let mut state = self.state.lock();
        state.games.clear();
        state.current = None;
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 31-multiplier rolling hash over the PGN text. Collisions only cost a
/// cache miss.
pub fn pgn_hash(pgn: &str) -> u32 {
    pgn.chars()
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::AdviceStatus;
    use crate::config::CacheSettings;
    use crate::parser::parse_pgn_string;
    use crate::position::INITIAL_FEN;

    const SHORT_GAME: &str = "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Bxc6 dxc6 5. O-O f6 6. d4 exd4 *\n";
    const OTHER_GAME: &str = "1. d4 d5 2. c4 e6 3. Nc3 Nf6 4. Bg5 Be7 5. e3 O-O 6. Nf3 h6 *\n";

    fn game(pgn: &str) -> (Vec<String>, Vec<String>) {
        let games = parse_pgn_string(pgn).unwrap();
        (games[0].positions.clone(), games[0].moves.clone())
    }

    fn small_batches() -> AnalysisCache {
        let config = AnalysisConfig {
            cache: CacheSettings { batch_size: 2 },
            ..AnalysisConfig::default()
        };
        AnalysisCache::with_config(config, AdviceTable::shared_builtin())
    }

    #[test]
    fn test_caches_share_the_builtin_table() {
        let first = AnalysisCache::new();
        let second = AnalysisCache::default();
        assert!(Arc::ptr_eq(&first.table, &second.table));
        assert!(std::ptr::eq(first.table.as_ref(), AdviceTable::builtin()));
    }

    #[test]
    fn test_lookup_before_analysis_is_absent() {
        let cache = AnalysisCache::new();
        assert!(cache.get_move_analysis(0).is_none());
        assert!(cache.current_game().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_and_query() {
        let cache = AnalysisCache::new();
        let (positions, moves) = game(SHORT_GAME);

        let result = cache
            .analyze_and_cache(SHORT_GAME, &positions, &moves)
            .await
            .unwrap();

        assert_eq!(result.moves.len(), 12);
        assert_eq!(result.pgn_hash, pgn_hash(SHORT_GAME));

        let first = cache.get_move_analysis(0).unwrap();
        assert_eq!(first.san.as_deref(), Some("e4"));
        assert_eq!(first.white_advice.side, Side::White);
        assert_eq!(first.black_advice.side, Side::Black);
        assert!(cache.get_move_analysis(12).is_none());
        assert_eq!(cache.period_at(0).unwrap().start, 0);
        assert_eq!(cache.game(&result.game_id).unwrap().game_id, result.game_id);

        for moment in &result.critical_moments {
            assert_eq!(result.critical_moment_at(moment.index), Some(moment));
        }
        assert!(result.critical_moment_at(0).is_none());
    }

    #[tokio::test]
    async fn test_reanalysis_is_idempotent_but_new_entry() {
        let cache = AnalysisCache::new();
        let (positions, moves) = game(SHORT_GAME);

        let first = cache
            .analyze_and_cache(SHORT_GAME, &positions, &moves)
            .await
            .unwrap();
        let second = cache
            .analyze_and_cache(SHORT_GAME, &positions, &moves)
            .await
            .unwrap();

        assert_eq!(first.moves, second.moves);
        assert_eq!(first.periods, second.periods);
        assert_eq!(first.critical_moments, second.critical_moments);
        assert_ne!(first.game_id, second.game_id);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_game().unwrap().game_id, second.game_id);
    }

    #[tokio::test]
    async fn test_initial_position_gets_shared_advice() {
        let cache = AnalysisCache::new();
        let positions = vec![INITIAL_FEN.to_string()];

        let result = cache.analyze_and_cache("", &positions, &[]).await.unwrap();
        let record = &result.moves[0];

        assert_eq!(record.situation_key, INITIAL_POSITION_KEY);
        assert_eq!(record.white_advice.status, AdviceStatus::InitialPosition);
        assert_eq!(record.white_advice.text(), record.black_advice.text());
        assert!(!record.white_advice.text().is_empty());
    }

    #[tokio::test]
    async fn test_stale_run_is_not_installed() {
        let cache = small_batches();
        let (old_positions, old_moves) = game(SHORT_GAME);
        let (new_positions, new_moves) = game(OTHER_GAME);

        let (stale, fresh) = tokio::join!(
            cache.analyze_and_cache(SHORT_GAME, &old_positions, &old_moves),
            cache.analyze_and_cache(OTHER_GAME, &new_positions, &new_moves),
        );
        let stale = stale.unwrap();
        let fresh = fresh.unwrap();

        let current = cache.current_game().unwrap();
        assert_eq!(current.game_id, fresh.game_id);
        assert_eq!(current.pgn_hash, pgn_hash(OTHER_GAME));
        assert!(cache.game(&stale.game_id).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_clearing() {
        let cache = AnalysisCache::new();
        let (positions, moves) = game(SHORT_GAME);

        let first = cache
            .analyze_and_cache(SHORT_GAME, &positions, &moves)
            .await
            .unwrap();
        cache
            .analyze_and_cache(SHORT_GAME, &positions, &moves)
            .await
            .unwrap();

        cache.clear_current();
        assert!(cache.get_move_analysis(0).is_none());
        assert!(cache.game(&first.game_id).is_some());

        cache.clear_all();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_position_aborts() {
        let cache = AnalysisCache::new();
        let positions = vec!["nonsense".to_string()];

        assert!(cache.analyze_and_cache("", &positions, &[]).await.is_err());
        assert!(cache.current_game().is_none());
    }

    #[test]
    fn test_pgn_hash_is_stable() {
        assert_eq!(pgn_hash(""), 0);
        assert_eq!(pgn_hash("a"), 97);
        assert_eq!(pgn_hash("ab"), 97 * 31 + 98);
        assert_ne!(pgn_hash(SHORT_GAME), pgn_hash(OTHER_GAME));
    }
}
