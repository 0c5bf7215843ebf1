//! Local HTTP server for endpoint tests.
//!
//! Routes can be swapped while the server runs, so a test can make an
//! endpoint fail between two refresh cycles.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::settings::Settings;

/// A canned response.
#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Route {
    pub fn new(status: u16, content_type: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type,
            body: body.to_string(),
            delay: None,
        }
    }

    /// `200 OK` with an `application/json` body.
    pub fn json(body: &str) -> Self {
        Self::new(200, "application/json", body)
    }

    /// Wait before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;

pub struct TestServer {
    addr: SocketAddr,
    routes: Routes,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Routes = Arc::default();
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::default();

        let task = {
            let routes = routes.clone();
            let hits = hits.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    let io = TokioIo::new(stream);
                    let routes = routes.clone();
                    let hits = hits.clone();

                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                            let routes = routes.clone();
                            let hits = hits.clone();
                            async move { handle_request(req, &routes, &hits).await }
                        });
                        let _ = http1::Builder::new().serve_connection(io, service).await;
                    });
                }
            })
        };

        Self {
            addr,
            routes,
            hits,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn set(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    /// Number of requests served for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Settings pointing every endpoint at this server.
    pub fn settings(&self, global: &str, local: &str, price: &str) -> Settings {
        Settings {
            global_height_url: self.url(global),
            local_height_url: self.url(local),
            price_url: self.url(price),
            external_timeout: Duration::from_secs(5),
            local_timeout: Duration::from_secs(5),
            ..Settings::default()
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    routes: &Routes,
    hits: &Arc<Mutex<HashMap<String, usize>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    *hits.lock().unwrap().entry(path.clone()).or_default() += 1;

    let route = routes.lock().unwrap().get(&path).cloned();
    let Some(route) = route else {
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("Not Found")))
            .unwrap());
    };

    if let Some(delay) = route.delay {
        tokio::time::sleep(delay).await;
    }

    Ok(Response::builder()
        .status(route.status)
        .header("Content-Type", route.content_type)
        .body(Full::new(Bytes::from(route.body)))
        .unwrap())
}
