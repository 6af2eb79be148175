use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct User;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Register, Login, Reset, List }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self { Phase::Register => "register", Phase::Login => "login", Phase::Reset => "reset", Phase::List => "list" } }
    fn span(&self) -> Span { match self { Phase::Register => info_span!("register"), Phase::Login => info_span!("login"), Phase::Reset => info_span!("reset"), Phase::List => info_span!("list") } }
}

impl OpMarker for User {
    const NAME: &'static str = "user";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("user") }
}
