//! Small JSON API demo: middleware, route parameters, and cookies.
//!
//! Run with `cargo run --example api -- --port 8080`, then try:
//!
//! ```text
//! curl -i http://127.0.0.1:8080/api/exchange
//! curl -i -X POST http://127.0.0.1:8080/api/login/42
//! curl -i -X PUT http://127.0.0.1:8080/api/update/7
//! ```

use clap::Parser;
use lite_web::{
    handler_fn, logging_middleware, middleware_fn, run, HandlerFunc, Method, Request, Response,
    ServeMux, StatusCode,
};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

#[derive(Parser)]
#[command(name = "api", about = "lite_web API demo server")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

// Permissive CORS: sets the usual headers and answers preflights with
// 204 before the handler runs.
fn cors_middleware() -> lite_web::Middleware {
    middleware_fn(|next: HandlerFunc| -> HandlerFunc {
        Arc::new(move |resp: &mut Response, req: &mut Request| {
            let next = next.clone();
            Box::pin(async move {
                resp.header().set("Access-Control-Allow-Origin", "*");
                resp.header()
                    .set("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS");
                resp.header()
                    .set("Access-Control-Allow-Headers", "Content-Type, Authorization");

                if req.method == Method::Options {
                    let _ = resp.write_header(StatusCode::NoContent).await;
                    return;
                }

                next(&mut *resp, &mut *req).await;
            })
        })
    })
}

// A made-up USD exchange rate, remembered in a cookie for a day.
fn exchange_handler() -> HandlerFunc {
    handler_fn(|resp, _req| {
        Box::pin(async move {
            let rate = 550
                + (SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .map(|d| d.subsec_millis() % 100)
                    .unwrap_or(0) as i64)
                - 50;

            let mut cookie = lite_web::Cookie::new("last-rate", rate.to_string());
            cookie.expires = Some(SystemTime::now() + Duration::from_secs(24 * 3600));
            let _ = resp.set_cookie(&cookie);

            resp.header().set("Content-Type", "application/json");
            let _ = resp.write_header(StatusCode::Ok).await;
            let _ = resp
                .write(format!("{{\"rate\": {rate}}}").as_bytes())
                .await;
        })
    })
}

fn login_handler() -> HandlerFunc {
    handler_fn(|resp, req| {
        Box::pin(async move {
            let id = req.param("id").to_owned();
            resp.header().set("Content-Type", "application/json");
            let _ = resp.write_header(StatusCode::Ok).await;
            let _ = resp.write(format!("{{\"id\": \"{id}\"}}").as_bytes()).await;
        })
    })
}

fn update_handler() -> HandlerFunc {
    handler_fn(|resp, req| {
        Box::pin(async move {
            resp.header().set("Content-Type", "application/json");
            match req.param("id").parse::<u64>() {
                Ok(id) => {
                    let _ = resp.write_header(StatusCode::Ok).await;
                    let _ = resp
                        .write(format!("{{\"id\": \"{}\"}}", id + 1000).as_bytes())
                        .await;
                }
                Err(_) => {
                    let _ = resp.write_header(StatusCode::BadRequest).await;
                    let _ = resp.write(b"{\"error\": \"Invalid ID\"}").await;
                }
            }
        })
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut mux = ServeMux::new(None);
    mux.use_middleware(logging_middleware());
    mux.use_middleware(cors_middleware());

    mux.add_route("/api/exchange", &[Method::Get], exchange_handler());
    mux.add_route("/api/login/:id", &[Method::Post], login_handler());
    mux.add_route("/api/update/:id", &[Method::Put], update_handler());

    let addr = format!("127.0.0.1:{}", args.port);
    run(&addr, mux).await.unwrap();
}
