//! Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::{domain::orders::OrdersServiceError, gateways::shipping::ShipmentError};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        error @ (OrdersServiceError::InvalidTransition { .. }
        | OrdersServiceError::NotCancellable(_)
        | OrdersServiceError::NotDeletable(_)
        | OrdersServiceError::Closed(_)) => StatusError::bad_request().brief(error.to_string()),
        OrdersServiceError::NoShipment => StatusError::not_found().brief("Order has no shipment"),
        OrdersServiceError::ShipmentExists => {
            StatusError::conflict().brief("Order already has a shipment")
        }
        OrdersServiceError::Shipment(error) => shipment_status_error(error),
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn shipment_status_error(error: ShipmentError) -> StatusError {
    match error {
        ShipmentError::NotConfigured => {
            StatusError::service_unavailable().brief("Shipping is not configured")
        }
        error @ (ShipmentError::Http(_) | ShipmentError::UnexpectedResponse(_)) => {
            error!("shipment dispatcher failed: {error}");

            StatusError::bad_gateway().brief("Shipping provider request failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use storefront_app::domain::orders::models::OrderStatus;

    use super::*;

    #[test]
    fn shipping_not_configured_is_unavailable() {
        let error = into_status_error(OrdersServiceError::Shipment(ShipmentError::NotConfigured));

        assert_eq!(error.code, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn dispatcher_failures_are_bad_gateway() {
        let error = into_status_error(OrdersServiceError::Shipment(
            ShipmentError::UnexpectedResponse("status 500".to_string()),
        ));

        assert_eq!(error.code, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn illegal_transitions_explain_themselves() {
        let error = into_status_error(OrdersServiceError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Processing,
        });

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
        assert_eq!(error.brief, "cannot move order from delivered to processing");
    }
}
