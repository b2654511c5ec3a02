use anyhow::{Result, anyhow};
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, options::*, types::FieldTable,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

struct Link {
    // Dropping the connection closes the channel with it.
    _conn: Connection,
    channel: Channel,
}

/// Publisher for a single durable queue. Connects on first use and
/// reconnects on the next publish after the channel drops.
#[derive(Clone)]
pub struct RabbitMqService {
    url: String,
    queue: String,
    link: Arc<Mutex<Option<Link>>>,
}

impl RabbitMqService {
    pub fn new(url: &str, queue: &str) -> Self {
        Self {
            url: url.to_string(),
            queue: queue.to_string(),
            link: Arc::new(Mutex::new(None)),
        }
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    async fn connect(&self) -> Result<Link> {
        info!("Connecting to RabbitMQ queue '{}'", self.queue);
        let conn = Connection::connect(self.url.as_str(), ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = conn
            .create_channel()
            .await
            .map_err(|e| anyhow!("Failed to create channel: {}", e))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| anyhow!("Failed to enable publisher confirms: {}", e))?;

        channel
            .queue_declare(
                self.queue.as_str(),
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue: {}", e))?;

        info!("✅ Connected to RabbitMQ");
        Ok(Link {
            _conn: conn,
            channel,
        })
    }

    async fn channel(&self) -> Result<Channel> {
        let mut link = self.link.lock().await;

        if let Some(current) = link.as_ref() {
            if current.channel.status().connected() {
                return Ok(current.channel.clone());
            }
            warn!("RabbitMQ channel dropped, reconnecting...");
        }

        let fresh = self.connect().await?;
        let channel = fresh.channel.clone();
        *link = Some(fresh);
        Ok(channel)
    }

    /// Publish a persistent JSON message and wait for the broker's confirm.
    /// A failed publish is reported, never repeated.
    pub async fn publish(&self, payload: &[u8], message_id: &str) -> Result<()> {
        let channel = self.channel().await?;

        let properties = BasicProperties::default()
            .with_delivery_mode(2) // Persistent
            .with_content_type("application/json".into())
            .with_message_id(message_id.into());

        let confirmation = channel
            .basic_publish(
                "",
                self.queue.as_str(),
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await
            .map_err(|e| anyhow!("Failed to publish message: {}", e))?
            .await
            .map_err(|e| anyhow!("Failed to confirm publication: {}", e))?;

        if confirmation.is_nack() {
            return Err(anyhow!("Broker rejected message {}", message_id));
        }

        Ok(())
    }
}
