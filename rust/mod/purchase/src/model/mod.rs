pub mod bid;
pub mod message;
pub mod order;
pub mod request;
pub mod rfq;
pub mod vendor;

pub use bid::{bid_name, Bid, BidStatus};
pub use message::Message;
pub use order::{OrderLine, PurchaseOrder};
pub use request::{
    CreateRequest, LineFeedback, PurchaseRequest, RequestLine, RequestLineInput, RequestStatus,
};
pub use rfq::{CreateRfq, Rfq, RfqLine, RfqStatus};
pub use vendor::Vendor;
