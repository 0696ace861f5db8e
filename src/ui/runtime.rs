use std::io::{self, Write};

use futures_util::{FutureExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::screen::{Prompt, PromptScreen};

use super::Renderer;

/// Submit `prompt` and render every view the screen publishes until the
/// request has been applied.
pub async fn submit_and_render<W: Write>(
    screen: &dyn PromptScreen,
    prompt: Prompt,
    renderer: &mut Renderer<W>,
) -> io::Result<()> {
    // Subscribe first so the Pending transition is observed too.
    let mut views = screen.subscribe();
    let mut task = screen.submit(prompt);

    loop {
        tokio::select! {
            biased;
            Some(view) = views.next() => renderer.render(&view)?,
            result = &mut task => {
                if let Err(err) = result {
                    tracing::warn!(screen = %screen.kind(), error = %err, "Request task did not complete");
                }
                break;
            }
        }
    }

    // Views published just before the task finished are still buffered.
    while let Some(Some(view)) = views.next().now_or_never() {
        renderer.render(&view)?;
    }
    renderer.render(&screen.view())?;
    renderer.finish()
}

/// Submit each non-blank line of `input` in turn. Returns how many lines
/// were submitted.
pub async fn run_lines<R, W>(
    screen: &dyn PromptScreen,
    input: R,
    renderer: &mut Renderer<W>,
) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut submitted = 0usize;

    while let Some(line) = lines.next_line().await? {
        let Ok(prompt) = Prompt::new(line) else {
            tracing::debug!(screen = %screen.kind(), "Skipping blank line");
            continue;
        };

        submit_and_render(screen, prompt, renderer).await?;
        submitted += 1;
    }

    Ok(submitted)
}
