/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use config::{Config, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

use crate::types::Address;

fn default_require_authorization() -> bool {
    return true
}

///Relay settings, passed to `Relayer::new`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayConfig {
    ///The pool contract withdrawals are sent to.
    pub contract: Address,
    ///The relay's own account, which pays for submission.
    pub sender: Address,
    ///Reject requests that carry no receiver authorization.
    #[serde(default = "default_require_authorization")]
    pub require_authorization: bool,
    ///Refuse to submit anything whose estimated cost exceeds this.
    #[serde(default)]
    pub gas_limit: Option<u64>,

} impl RelayConfig {
    pub fn new(contract: Address, sender: Address) -> Self {
        return Self{
            contract,
            sender,
            require_authorization: default_require_authorization(),
            gas_limit: None
        }
    }

    ///Load from `RELAY_*` environment variables (and a `.env` file, if there is one),
    ///e.g. `RELAY_CONTRACT`, `RELAY_SENDER`, `RELAY_REQUIRE_AUTHORIZATION`, `RELAY_GAS_LIMIT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let conf = Config::builder()
            .add_source(Environment::with_prefix("RELAY").try_parsing(true))
            .build()?;
        return conf.try_deserialize()
    }
}
