use lite_web::{handler_fn, run, Method, ServeMux, StatusCode};

#[tokio::main]
async fn main() {
    let mut mux = ServeMux::new(None);

    mux.add_route(
        "/",
        &[Method::Get],
        handler_fn(|resp, _req| {
            Box::pin(async move {
                resp.header().set("Content-Type", "text/plain");
                let _ = resp.write_header(StatusCode::Ok).await;
                let _ = resp.write(b"Hello, world!").await;
            })
        }),
    );

    run("127.0.0.1:8080", mux).await.unwrap();
}
