use std::net::SocketAddr;
use std::time::Duration;

use searchbench_testserver::{ResponseMode, TestServerOptions};
use tokio::net::TcpListener;

const USAGE: &str = "searchbench-testserver\n\nUSAGE:\n  searchbench-testserver [--bind 127.0.0.1:0] [--delay-ms 0] [--mode ok|server-error|malformed]\n\nOUTPUT:\n  Prints HTTP_URL=<url> to stdout once ready.";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut bind_addr: SocketAddr = "127.0.0.1:0".parse()?;
    let mut opts = TestServerOptions::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bind" => {
                let addr = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--bind requires an address, e.g. 127.0.0.1:0")
                })?;
                bind_addr = addr.parse()?;
            }
            "--delay-ms" => {
                let ms = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--delay-ms requires a number"))?;
                opts.delay = Duration::from_millis(ms.parse()?);
            }
            "--mode" => {
                let mode = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--mode requires one of ok, server-error, malformed")
                })?;
                opts.mode = match mode.as_str() {
                    "ok" => ResponseMode::Ok,
                    "server-error" => ResponseMode::ServerError,
                    "malformed" => ResponseMode::Malformed,
                    other => return Err(anyhow::anyhow!("unknown mode: {other}")),
                };
            }
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                return Ok(());
            }
            other => {
                return Err(anyhow::anyhow!("unknown argument: {other}"));
            }
        }
    }

    let listener = TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    let stats = searchbench_testserver::TestServerStats::default();
    let app = searchbench_testserver::router(stats, opts);

    println!("HTTP_URL=http://{addr}");

    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = tokio::signal::ctrl_c().await;
    });

    serve.await?;
    Ok(())
}
