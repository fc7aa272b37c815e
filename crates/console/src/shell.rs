//! Line-driven event loop for the console.
//!
//! One task multiplexes input lines, completions of in-flight work and a
//! periodic toast-expiry tick with `tokio::select!`. In-flight work covers
//! list/create/delete requests, image probes and preview encodings.
//! Requests are pushed into a [`FuturesUnordered`] instead of being
//! awaited inline, so input keeps flowing while they run. The controller's
//! submitting gate prevents a duplicate create.
//!
//! On end of input or `quit` the loop waits for in-flight work to settle
//! before returning.

use std::time::Duration;

use almirah_client::ClientError;
use almirah_core::image_intake::{ImageFile, IntakeError, PreviewJob, PreviewReady};
use almirah_core::product::{Category, Product};
use almirah_core::types::DbId;
use futures::future::{join_all, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{Instant, MissedTickBehavior};

use crate::catalog::CatalogApi;
use crate::command::{Command, HELP};
use crate::controller::{AdminController, LoadTicket, SubmitOutcome};
use crate::view;

/// How often expired toasts are pruned.
const TOAST_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellOptions {
    /// Probe product images after each listing.
    pub probe_images: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self { probe_images: true }
    }
}

/// Result of one piece of background work.
enum Completion {
    Loaded(LoadTicket, Result<Vec<Product>, ClientError>),
    Created(Result<Product, ClientError>),
    Deleted(DbId, Result<(), ClientError>),
    Preview(Result<PreviewReady, IntakeError>),
    Probed(Vec<DbId>),
}

type Pending = FuturesUnordered<BoxFuture<'static, Completion>>;

/// Run the console until input ends or the user quits.
pub async fn run<A, R, W>(
    controller: &mut AdminController<A>,
    input: R,
    output: &mut W,
    options: ShellOptions,
) -> std::io::Result<()>
where
    A: CatalogApi + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut pending: Pending = FuturesUnordered::new();
    let mut lines = input.lines();
    let mut ticker = tokio::time::interval(TOAST_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("Console started");
    start_load(controller, &pending, None);
    write(output, &view::screen(controller, Instant::now())).await?;

    loop {
        tokio::select! {
            // Finished work is applied before the next line is read.
            biased;

            Some(done) = pending.next(), if !pending.is_empty() => {
                apply(controller, &pending, done, options, output).await?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(controller, &pending, command, output).await?,
                    Err(e) => write(output, &format!("{e}\n")).await?,
                }
            }
            _ = ticker.tick() => {
                if controller.prune_toast(Instant::now()) {
                    tracing::debug!("Toast expired");
                }
            }
        }
    }

    while let Some(done) = pending.next().await {
        apply(controller, &pending, done, options, output).await?;
    }
    tracing::info!("Console stopped");
    Ok(())
}

async fn handle<A, W>(
    controller: &mut AdminController<A>,
    pending: &Pending,
    command: Command,
    output: &mut W,
) -> std::io::Result<()>
where
    A: CatalogApi + 'static,
    W: AsyncWrite + Unpin,
{
    match command {
        Command::List(filter) => {
            start_load(controller, pending, filter);
            write(output, "Loading products...\n").await?;
        }
        Command::Show => {
            write(output, &view::screen(controller, Instant::now())).await?;
        }
        Command::Set(field, value) => {
            if let Err(e) = controller.set_field(field, value) {
                write(output, &format!("{e}\n")).await?;
            }
        }
        Command::Category(category) => controller.set_category(category),
        Command::Image(path) => {
            let job = match ImageFile::from_path(&path).await {
                Ok(file) => controller.pick_image(file),
                Err(e) => {
                    controller.reject_image(&e);
                    None
                }
            };
            start_preview(pending, job);
            write(output, &view::form(controller)).await?;
        }
        Command::Drop(path) => {
            let job = match ImageFile::from_path(&path).await {
                Ok(file) => controller.drop_image(file),
                Err(e) => {
                    controller.drag_leave();
                    controller.reject_image(&e);
                    None
                }
            };
            start_preview(pending, job);
            write(output, &view::form(controller)).await?;
        }
        Command::ClearPicker => {
            controller.clear_picker();
            write(output, &view::form(controller)).await?;
        }
        Command::DragEnter => controller.drag_enter(),
        Command::DragLeave => controller.drag_leave(),
        Command::Unimage => controller.remove_image(),
        Command::Submit => match controller.begin_submit() {
            Ok(request) => {
                let api = controller.api();
                pending.push(
                    async move {
                        Completion::Created(
                            api.create_product(&request.product, &request.image).await,
                        )
                    }
                    .boxed(),
                );
                write(output, "Submitting...\n").await?;
            }
            Err(SubmitOutcome::AlreadySubmitting) => {
                write(output, "A product is already being submitted\n").await?;
            }
            Err(_) => {
                write(output, &view::form(controller)).await?;
            }
        },
        Command::Delete(id) => {
            if controller.request_delete(id) {
                write(
                    output,
                    &format!("Are you sure you want to delete product {id}? (yes/no)\n"),
                )
                .await?;
            } else {
                write(output, &format!("No product with id {id}\n")).await?;
            }
        }
        Command::Yes => match controller.confirm_delete() {
            Some(id) => {
                let api = controller.api();
                pending.push(
                    async move { Completion::Deleted(id, api.delete_product(id).await) }.boxed(),
                );
            }
            None => write(output, "Nothing to confirm\n").await?,
        },
        Command::No => {
            if controller.cancel_delete().is_some() {
                write(output, "Delete cancelled\n").await?;
            }
        }
        Command::Dismiss => controller.dismiss_toast(),
        Command::Help => write(output, &format!("{HELP}\n")).await?,
        Command::Quit => {}
    }
    Ok(())
}

async fn apply<A, W>(
    controller: &mut AdminController<A>,
    pending: &Pending,
    done: Completion,
    options: ShellOptions,
    output: &mut W,
) -> std::io::Result<()>
where
    A: CatalogApi + 'static,
    W: AsyncWrite + Unpin,
{
    match done {
        Completion::Loaded(ticket, result) => {
            if controller.finish_load(ticket, result) && options.probe_images {
                start_probe(controller, pending);
            }
        }
        Completion::Created(result) => {
            controller.finish_submit(result);
        }
        Completion::Deleted(id, result) => {
            controller.finish_delete(id, result);
        }
        Completion::Preview(Ok(ready)) => {
            if !controller.complete_preview(ready) {
                tracing::debug!("Discarded stale image preview");
            }
            return Ok(());
        }
        Completion::Preview(Err(e)) => {
            tracing::warn!(error = %e, "Image preview failed");
            return Ok(());
        }
        Completion::Probed(failed) => {
            if failed.is_empty() {
                return Ok(());
            }
            for id in failed {
                controller.mark_image_failed(id);
            }
        }
    }
    write(output, &view::screen(controller, Instant::now())).await
}

fn start_load<A: CatalogApi + 'static>(
    controller: &mut AdminController<A>,
    pending: &Pending,
    filter: Option<Category>,
) {
    let ticket = controller.begin_load(filter);
    let api = controller.api();
    pending.push(
        async move {
            let result = api.list_products(ticket.filter.as_ref()).await;
            Completion::Loaded(ticket, result)
        }
        .boxed(),
    );
}

fn start_preview(pending: &Pending, job: Option<PreviewJob>) {
    if let Some(job) = job {
        pending.push(async move { Completion::Preview(job.run().await) }.boxed());
    }
}

fn start_probe<A: CatalogApi + 'static>(controller: &AdminController<A>, pending: &Pending) {
    let targets: Vec<(DbId, String)> = controller
        .products()
        .iter()
        .map(|p| (p.id, controller.image_src(p)))
        .collect();
    let api = controller.api();
    pending.push(
        async move {
            let checks = targets.iter().map(|(id, url)| {
                let api = &api;
                async move { (*id, api.image_available(url).await) }
            });
            let failed = join_all(checks)
                .await
                .into_iter()
                .filter_map(|(id, ok)| (!ok).then_some(id))
                .collect();
            Completion::Probed(failed)
        }
        .boxed(),
    );
}

async fn write<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}
