use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use futures_util::future::LocalBoxFuture;
use slog::{Logger, info, warn};
use std::future::{Ready, ready};
use std::rc::Rc;

/// 记录每个 API 请求的开始与完成
pub struct ApiLoggerMiddleware {
    pub logger: Logger,
}

impl<S, B> Transform<S, ServiceRequest> for ApiLoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ApiLoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiLoggerMiddlewareService {
            service: Rc::new(service),
            logger: self.logger.clone(),
        }))
    }
}

pub struct ApiLoggerMiddlewareService<S> {
    service: Rc<S>,
    logger: Logger,
}

impl<S, B> Service<ServiceRequest> for ApiLoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = uuid::Uuid::new_v4().to_string();
        let logger = self.logger.new(slog::o!("request_id" => request_id));
        let method = req.method().to_string();
        let path = req.path().to_string();
        let peer_addr = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();

        // 登录请求的查询串里带有密码, 不记录
        let query_string = if path.ends_with("/login") {
            String::new()
        } else {
            req.query_string().to_string()
        };

        info!(logger, "API Request Started";
              "method" => &method,
              "path" => &path,
              "query_params" => &query_string,
              "peer_addr" => &peer_addr);

        let fut = self.service.call(req);

        Box::pin(async move {
            let start_time = std::time::Instant::now();
            let res = fut.await?;
            let duration = start_time.elapsed().as_millis() as u64;

            let status = res.response().status();
            if status.is_server_error() {
                warn!(logger, "API Request Failed";
                      "method" => &method,
                      "path" => &path,
                      "status" => status.as_u16(),
                      "duration_ms" => duration);
            } else {
                info!(logger, "API Request Completed";
                      "method" => &method,
                      "path" => &path,
                      "status" => status.as_u16(),
                      "duration_ms" => duration);
            }
            Ok(res)
        })
    }
}
