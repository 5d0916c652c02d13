use ::std::sync::Arc;
use lambda_runtime::{service_fn, Error as LambdaError, LambdaEvent};
use common_types::ApiGateway::ApiGatewayProxyResponse;
use common_types_contact::{
    Email::EmailTransport,
    Routes::{self, contact::ContactEvent},
    State::AppState,
};

#[tracing::instrument(skip(appstate, event), fields(req_id = %event.context.request_id))]
async fn handler<T: EmailTransport>(
    appstate: AppState<T>,
    event: LambdaEvent<ContactEvent>,
) -> Result<ApiGatewayProxyResponse, LambdaError> {
    let (ContactEvent(payload), context) = event.into_parts();
    Ok(Routes::contact::request(&*appstate, payload, &context.request_id).await)
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_target(false)
            .without_time()
            .init();

    let appstate = common_types_contact::State::make_state()?;

    lambda_runtime::run(service_fn(|event: LambdaEvent<ContactEvent>| async {
        handler(Arc::clone(&appstate), event).await
    }))
    .await
}
