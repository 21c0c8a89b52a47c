//! JSON-RPC 2.0 communication layer for web frontend integration.
//!
//! Implements bidirectional messaging between the Bevy engine and an embedding web page via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Adding New RPC Methods
//!
//! ### 1. Define Request Handler
//!
//! Add a new method case in `handle_rpc_request()`:
//!
//! ```rust,ignore
//! fn handle_rpc_request(request: &RpcRequest, ...) -> Option<RpcResponse> {
//!     let result = match request.method.as_str() {
//!         "your_method_name" => handle_your_method(&request.params, ...),
//!         // ... existing methods
//!         _ => return Some(create_error_response(id, -32601, "Method not found", None)),
//!     };
//!     // ... response creation
//! }
//! ```
//!
//! ### 2. Implement Handler Function
//!
//! ```rust,ignore
//! fn handle_your_method(
//!     params: &Value,
//!     // ... required resources
//! ) -> Result<Value, RpcError> {
//!     // Deserialize parameters
//!     #[derive(Deserialize)]
//!     struct YourParams {
//!         field: String,
//!     }
//!
//!     let parsed = serde_json::from_value::<YourParams>(params.clone())
//!         .map_err(|_| RpcError::invalid_params("Expected 'field' parameter"))?;
//!
//!     // Process logic here
//!
//!     // Return success response
//!     Ok(json!({
//!         "success": true,
//!         "result": parsed.field
//!     }))
//! }
//! ```
//!
//! ### 3. Call From the Page
//!
//! ```typescript
//! // Request-response pattern
//! const response = await window.postMessage({
//!   jsonrpc: "2.0",
//!   method: "your_method_name",
//!   params: { field: "value" },
//!   id: 1
//! }, "*");
//!
//! // Notification pattern (no response expected)
//! window.postMessage({
//!   jsonrpc: "2.0",
//!   method: "your_notification",
//!   params: { data: "value" }
//! }, "*");
//! ```
//!
//! ## Sending Notifications from Bevy
//!
//! Use `WebRpcInterface::send_notification()` to push updates to the page:
//!
//! ```rust,ignore
//! fn your_system(mut rpc: ResMut<WebRpcInterface>) {
//!     rpc.send_notification("event_name", json!({ "data": "value" }));
//! }
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Line Drawing
//! - `set_line_drawing {enabled}`: Enable or disable click picking
//! - `toggle_line_drawing`: Flip click picking
//! - `get_line_drawing_state`: Current state and number of buffered picks
//!
//! ### Profile
//! - `get_profile`: Last sampled sequence and last resolved elevation samples
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Outbound Notifications
//!
//! - `line_drawing_changed {enabled}`
//! - `line_point_picked {index, position}`
//! - `line_sampled {points}`
//! - `line_pick_aborted {reason, message}`
//! - `elevation_profile {samples, series}`
//! - `loading_progress {settings_loaded, stage}`
//! - `fps_update {fps}`

/// JSON-RPC 2.0 bidirectional communication system for frontend integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
