//! AT-SPI2 backend over the accessibility D-Bus bus.
//!
//! The accessibility bus is separate from the session bus: its address is
//! asked to `org.a11y.Bus` on the session bus, unless `AT_SPI_BUS_ADDRESS`
//! is set. Every widget is an object exported by its application at some
//! object path; the desktop is the registry's root object.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;
use zbus::blocking::{connection, Connection, Proxy};
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use crate::node::Accessible;
use crate::result::{E2eError, E2eResult};
use crate::session::Desktop;

const REGISTRY: &str = "org.a11y.atspi.Registry";
const ROOT_PATH: &str = "/org/a11y/atspi/accessible/root";
const INTERFACE_PREFIX: &str = "org.a11y.atspi.";
const ACCESSIBLE: &str = "org.a11y.atspi.Accessible";
const ACTION: &str = "org.a11y.atspi.Action";
const TEXT: &str = "org.a11y.atspi.Text";
const PROPERTIES: &str = "org.freedesktop.DBus.Properties";

/// Environment variable with an explicit accessibility bus address
pub const BUS_ADDRESS_ENV: &str = "AT_SPI_BUS_ADDRESS";

fn bus_error(e: zbus::Error) -> E2eError {
    E2eError::backend(e.to_string())
}

/// Connect to the accessibility bus
pub fn connect_a11y_bus() -> E2eResult<Connection> {
    let address = match std::env::var(BUS_ADDRESS_ENV) {
        Ok(address) if !address.is_empty() => address,
        _ => {
            let session = Connection::session().map_err(bus_error)?;
            let bus = Proxy::new(&session, "org.a11y.Bus", "/org/a11y/bus", "org.a11y.Bus")
                .map_err(bus_error)?;
            bus.call::<_, _, String>("GetAddress", &()).map_err(bus_error)?
        }
    };
    debug!(address = %address, "connecting to accessibility bus");
    connection::Builder::address(address.as_str())
        .and_then(connection::Builder::build)
        .map_err(bus_error)
}

/// Widget exported on the accessibility bus
#[derive(Clone)]
pub struct AtspiNode {
    conn: Connection,
    bus_name: String,
    path: OwnedObjectPath,
}

impl AtspiNode {
    /// Handle to the object `path` owned by `bus_name`
    #[must_use]
    pub fn new(conn: Connection, bus_name: impl Into<String>, path: OwnedObjectPath) -> Self {
        Self {
            conn,
            bus_name: bus_name.into(),
            path,
        }
    }

    /// Bus name of the owning application
    #[must_use]
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Object path of the widget
    #[must_use]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    fn proxy(&self, interface: &'static str) -> E2eResult<Proxy<'_>> {
        Proxy::new(
            &self.conn,
            self.bus_name.as_str(),
            self.path.as_str(),
            interface,
        )
        .map_err(bus_error)
    }

    fn get_property(&self, interface: &'static str, name: &str) -> zbus::Result<OwnedValue> {
        Proxy::new(
            &self.conn,
            self.bus_name.as_str(),
            self.path.as_str(),
            PROPERTIES,
        )?
        .call("Get", &(interface, name))
    }

    fn string_property(&self, interface: &'static str, name: &str) -> E2eResult<String> {
        let value = self.get_property(interface, name).map_err(bus_error)?;
        String::try_from(value).map_err(|e| E2eError::backend(e.to_string()))
    }

    fn count_property(&self, interface: &'static str, name: &str) -> E2eResult<usize> {
        let value = self.get_property(interface, name).map_err(bus_error)?;
        let count = i32::try_from(value).map_err(|e| E2eError::backend(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn optional_string(&self, interface: &'static str, name: &str) -> E2eResult<Option<String>> {
        match self.get_property(interface, name) {
            Ok(value) => Ok(String::try_from(value).ok()),
            Err(zbus::Error::MethodError(..) | zbus::Error::FDO(_)) => Ok(None),
            Err(e) => Err(bus_error(e)),
        }
    }

    fn index_arg(index: usize) -> E2eResult<i32> {
        i32::try_from(index).map_err(|_| E2eError::backend(format!("index {index} out of range")))
    }
}

impl PartialEq for AtspiNode {
    fn eq(&self, other: &Self) -> bool {
        self.bus_name == other.bus_name && self.path == other.path
    }
}

impl fmt::Debug for AtspiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtspiNode")
            .field("bus_name", &self.bus_name)
            .field("path", &self.path.as_str())
            .finish_non_exhaustive()
    }
}

impl Accessible for AtspiNode {
    fn role_name(&self) -> E2eResult<String> {
        self.proxy(ACCESSIBLE)?
            .call("GetRoleName", &())
            .map_err(bus_error)
    }

    fn name(&self) -> E2eResult<String> {
        self.string_property(ACCESSIBLE, "Name")
    }

    fn text(&self) -> E2eResult<Option<String>> {
        if !self.interfaces()?.iter().any(|i| i == "Text") {
            return Ok(None);
        }
        self.proxy(TEXT)?
            .call::<_, _, String>("GetText", &(0i32, -1i32))
            .map(Some)
            .map_err(bus_error)
    }

    fn child_count(&self) -> E2eResult<usize> {
        self.count_property(ACCESSIBLE, "ChildCount")
    }

    fn child_at(&self, index: usize) -> E2eResult<Self> {
        let (bus_name, path): (String, OwnedObjectPath) = self
            .proxy(ACCESSIBLE)?
            .call("GetChildAtIndex", &Self::index_arg(index)?)
            .map_err(bus_error)?;
        Ok(Self::new(self.conn.clone(), bus_name, path))
    }

    fn action_count(&self) -> E2eResult<usize> {
        if !self.interfaces()?.iter().any(|i| i == "Action") {
            return Ok(0);
        }
        self.count_property(ACTION, "NActions")
    }

    fn action_name(&self, index: usize) -> E2eResult<String> {
        self.proxy(ACTION)?
            .call("GetName", &Self::index_arg(index)?)
            .map_err(bus_error)
    }

    fn do_action(&self, index: usize) -> E2eResult<bool> {
        self.proxy(ACTION)?
            .call("DoAction", &Self::index_arg(index)?)
            .map_err(bus_error)
    }

    fn property(&self, name: &str) -> E2eResult<Option<String>> {
        let attributes: HashMap<String, String> = self
            .proxy(ACCESSIBLE)?
            .call("GetAttributes", &())
            .map_err(bus_error)?;
        Ok(attributes.get(name).cloned())
    }

    fn getter(&self, method: &str) -> E2eResult<Option<String>> {
        match method {
            "get_description" => self.optional_string(ACCESSIBLE, "Description"),
            "get_locale" => self.optional_string(ACCESSIBLE, "Locale"),
            "get_help_text" => self.optional_string(ACCESSIBLE, "HelpText"),
            "get_accessible_id" => self.optional_string(ACCESSIBLE, "AccessibleId"),
            "get_index_in_parent" => self
                .proxy(ACCESSIBLE)?
                .call::<_, _, i32>("GetIndexInParent", &())
                .map(|i| Some(i.to_string()))
                .map_err(bus_error),
            _ => Ok(None),
        }
    }

    fn interfaces(&self) -> E2eResult<Vec<String>> {
        let names: Vec<String> = self
            .proxy(ACCESSIBLE)?
            .call("GetInterfaces", &())
            .map_err(bus_error)?;
        Ok(names
            .into_iter()
            .map(|n| n.strip_prefix(INTERFACE_PREFIX).map(str::to_string).unwrap_or(n))
            .collect())
    }
}

/// The AT-SPI desktop: applications are the children of the registry root
#[derive(Debug, Clone)]
pub struct AtspiDesktop {
    root: AtspiNode,
}

impl AtspiDesktop {
    /// Connect to the accessibility bus
    pub fn connect() -> E2eResult<Self> {
        let conn = connect_a11y_bus()?;
        let path = OwnedObjectPath::try_from(ROOT_PATH).map_err(|e| E2eError::backend(e.to_string()))?;
        Ok(Self {
            root: AtspiNode::new(conn, REGISTRY, path),
        })
    }

    /// Registry root object
    #[must_use]
    pub fn root(&self) -> &AtspiNode {
        &self.root
    }
}

impl Desktop for AtspiDesktop {
    type Node = AtspiNode;

    fn applications(&self) -> E2eResult<Vec<AtspiNode>> {
        crate::node::children(&self.root)
    }
}
