pub mod config;
pub mod ctx;
pub mod emit;
pub mod ops;

use ctx::LogCtx;

pub fn agg() -> LogCtx<ops::agg::Agg> { LogCtx::new() }
pub fn feed() -> LogCtx<ops::feed::Feed> { LogCtx::new() }
pub fn user() -> LogCtx<ops::user::User> { LogCtx::new() }
pub fn browse() -> LogCtx<ops::browse::Browse> { LogCtx::new() }
pub fn init() -> LogCtx<ops::init::Init> { LogCtx::new() }
