use std::io::Write as _;

use anyhow::anyhow;
use caravan_client::{
  NomadClient,
  entities::config::cli::args::logs::LogsArgs,
  tail::{LogTail, LogTailEvent, LogTarget},
};

pub async fn handle(
  args: &LogsArgs,
  client: NomadClient,
) -> anyhow::Result<()> {
  if !args.follow {
    let text = client
      .fetch_logs(
        &args.allocation,
        &args.task,
        args.kind,
        true,
      )
      .await?;
    println!("{text}");
    return Ok(());
  }

  let (mut tail, mut events) = LogTail::new(client);
  tail.set_target(Some(LogTarget {
    allocation: args.allocation.clone(),
    task: args.task.clone(),
    kind: args.kind,
  }));
  tail.start();

  info!(
    "Following {} logs for {} / {} | ctrl-c to stop",
    args.kind.as_ref(),
    args.allocation,
    args.task
  );

  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => {
        tail.stop();
        return Ok(());
      }
      event = events.recv() => match event {
        Some(LogTailEvent::Append(text)) => {
          print!("{text}");
          std::io::stdout().flush().ok();
        }
        Some(LogTailEvent::Error(e)) => {
          return Err(anyhow!("Log stream failed | {e}"));
        }
        // Only possible once the tail itself is gone.
        None => return Ok(()),
      }
    }
  }
}
