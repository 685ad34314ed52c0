mod common;
mod routing;
mod walk_away;
