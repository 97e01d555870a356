use std::convert::TryFrom;
use tokio::time::Duration;

/// Tunables for one member. Anything left `None` takes the default of a standard deployment.
#[derive(Clone, Debug, Default)]
pub struct MemberOptions {
    pub heartbeat_interval: Option<Duration>,
    pub heartbeat_timeout: Option<Duration>,
    pub peer_rpc_timeout: Option<Duration>,
    pub delivery_poll_timeout: Option<Duration>,
    pub join_attempts: Option<u32>,
}

#[derive(Clone, Debug)]
pub(super) struct MemberOptionsValidated {
    pub heartbeat_interval: Duration,
    pub heartbeat_timeout: Duration,
    pub peer_rpc_timeout: Duration,
    pub delivery_poll_timeout: Duration,
    pub join_attempts: u32,
}

impl MemberOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.heartbeat_interval.as_millis() == 0 {
            return Err("Heartbeat interval must be non-zero");
        }
        if self.heartbeat_interval >= self.heartbeat_timeout {
            return Err("Heartbeat timeout must be greater than the heartbeat interval");
        }
        if self.peer_rpc_timeout > self.heartbeat_interval {
            return Err("Peer RPC timeout must not exceed the heartbeat interval");
        }
        if self.delivery_poll_timeout.as_millis() == 0 {
            return Err("Live delivery poll timeout must be non-zero");
        }
        if self.join_attempts == 0 {
            return Err("At least one join attempt is required");
        }

        Ok(())
    }
}

impl TryFrom<MemberOptions> for MemberOptionsValidated {
    type Error = &'static str;

    fn try_from(options: MemberOptions) -> Result<Self, Self::Error> {
        let values = MemberOptionsValidated {
            heartbeat_interval: options.heartbeat_interval.unwrap_or(Duration::from_secs(2)),
            heartbeat_timeout: options.heartbeat_timeout.unwrap_or(Duration::from_secs(10)),
            peer_rpc_timeout: options.peer_rpc_timeout.unwrap_or(Duration::from_secs(1)),
            delivery_poll_timeout: options.delivery_poll_timeout.unwrap_or(Duration::from_secs(5)),
            join_attempts: options.join_attempts.unwrap_or(3),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = MemberOptionsValidated::try_from(MemberOptions::default()).unwrap();
        assert_eq!(options.heartbeat_interval, Duration::from_secs(2));
        assert_eq!(options.heartbeat_timeout, Duration::from_secs(10));
        assert_eq!(options.join_attempts, 3);
    }

    #[test]
    fn timeout_must_exceed_interval() {
        let options = MemberOptions {
            heartbeat_interval: Some(Duration::from_secs(5)),
            heartbeat_timeout: Some(Duration::from_secs(5)),
            ..MemberOptions::default()
        };
        assert!(MemberOptionsValidated::try_from(options).is_err());
    }

    #[test]
    fn peer_calls_must_fit_in_an_interval() {
        let options = MemberOptions {
            heartbeat_interval: Some(Duration::from_millis(200)),
            heartbeat_timeout: Some(Duration::from_secs(1)),
            peer_rpc_timeout: Some(Duration::from_millis(300)),
            ..MemberOptions::default()
        };
        assert!(MemberOptionsValidated::try_from(options).is_err());

        let options = MemberOptions {
            heartbeat_interval: Some(Duration::from_millis(200)),
            heartbeat_timeout: Some(Duration::from_secs(1)),
            peer_rpc_timeout: Some(Duration::from_millis(200)),
            ..MemberOptions::default()
        };
        assert!(MemberOptionsValidated::try_from(options).is_ok());
    }

    #[test]
    fn zero_join_attempts_rejected() {
        let options = MemberOptions {
            join_attempts: Some(0),
            ..MemberOptions::default()
        };
        assert!(MemberOptionsValidated::try_from(options).is_err());
    }
}
