//! Client evaluation pages: finished-project list, score form, client ranking.

pub mod form;
pub mod list;
pub mod ranking;

pub use form::{EvaluationFormController, FormError, FormPhase};
pub use list::{EvaluationListController, GradeOverlay, ListError, ListView, ProjectRow, RowAction};
pub use ranking::{ClientRankingController, RankingView};
