/*!
 * Parsers for the transponder registers relayed over the air.
 *
 * The extended squitter type codes map to the so-called BDS registers
 * (Comm-B Data Selector): identification is register 0,8, positions
 * are 0,5 and 0,6, and so on. The same parsers therefore serve both
 * the ME field of DF 17/18 and, for the registers of the ELS service
 * (1,0, 2,0, 3,0), the MB field of Comm-B replies (DF 20/21).
 */

pub mod bds05;
pub mod bds06;
pub mod bds08;
pub mod bds09;
pub mod bds10;
pub mod bds20;
pub mod bds30;
pub mod bds61;
pub mod bds65;
