//! Tournament business logic: scheduling, standings, group stage and knockout.

mod bracket;
mod group_stage;
mod knockout;
mod round_robin;
mod setup;
mod simulation;
mod standings;
mod swiss;

pub use bracket::{advance_bracket, build_bracket, seeding_order};
pub use group_stage::{
    create_groups, generate_group_round, generate_next_rounds, generate_round, group_standings,
    select_qualifiers, standings,
};
pub use knockout::{advance_knockout, champion, start_knockout};
pub use round_robin::{berger_schedule, round_count};
pub use setup::start_group_stage;
pub use simulation::{simulate_match, simulate_round, simulate_set};
pub use standings::{compare, compute_standings, rank_players, Standing};
pub use swiss::pair_swiss_round;
