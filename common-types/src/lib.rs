#[allow(non_snake_case)]
pub mod ApiGateway {
    pub use aws_lambda_events::encodings::Body;
    pub use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
}
