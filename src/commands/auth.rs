use super::render::render_signed_out;
use super::CommandContext;
use crate::error::JobResult;

/// Run the consent flow and store the token
pub async fn sign_in(ctx: &mut CommandContext) -> JobResult<String> {
    ctx.session.sign_in().await?;
    Ok("Signed in.\n".to_string())
}

/// Revoke and forget the stored token
pub async fn sign_out(ctx: &mut CommandContext) -> JobResult<String> {
    ctx.session.sign_out().await?;
    Ok(render_signed_out())
}
