//! Utilities for the crawler service, internal to the crate.

/// Spawns a set of parallel actors in a [`JoinSet`], and cancels all actors if any of them fail.
/// The type of the error in the [`CrawlerActor`]s is erased to avoid having to specify a common
/// error type between actors.
///
/// Each argument is an iterator of `(actor, start data)` pairs, so an actor may be optional
/// (`Option`) or run as several workers (`Vec`). Evaluates to the rendered errors of the actors
/// that failed.
///
/// [`JoinSet`]: tokio::task::JoinSet
/// [`CrawlerActor`]: crate::CrawlerActor
macro_rules! spawn_and_wait {
    ($cancellation:expr, actors = [$($actors:expr$(,)?)*]) => {{
        let mut task_handles = tokio::task::JoinSet::new();

        $(
            for (actor, context) in $actors {
                task_handles.spawn(async move {
                    if let Err(e) = actor.start(context).await {
                        return Err(format!("{e:?}"));
                    }
                    Ok(())
                });
            }
        )*

        let mut failures = Vec::new();
        while let Some(result) = task_handles.join_next().await {
            let failure = match result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => e.to_string(),
            };
            error!(target: "service", "Critical error in sub-routine: {failure}");
            failures.push(failure);

            // Cancel all tasks and gracefully shutdown.
            $cancellation.cancel();
        }
        failures
    }};
}

// Export the `spawn_and_wait` macro for use in other modules.
pub(crate) use spawn_and_wait;
