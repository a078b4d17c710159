//! Provider adapter implementations.

mod instagram;
mod media;
pub mod mock;
mod openai;
mod resend;
mod runway;

pub use instagram::InstagramClient;
pub use media::HttpMediaTransform;
pub use mock::{
    MockCaptionGenerator, MockMediaTransform, MockNotifier, MockPromptGenerator,
    MockPublishPlatform, MockVideoGenerator, SentEmail,
};
pub use openai::OpenAiClient;
pub use resend::ResendNotifier;
pub use runway::RunwayClient;
